use crate::db::Database;
use crate::errors::VigiloError;

use super::{AttackPattern, CatalogClient};

/// Outcome of the legacy create-only load (phase 1, spec §7).
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyLoadSummary {
    pub total: usize,
    pub created: u32,
}

/// Phase 1 of MITRE sync: a create-only pass over the same attack-pattern
/// feed, grounded on `mitre_loader.load_mitre` — existing rows are left
/// untouched, only codes the catalog has never seen are inserted.
pub async fn legacy_load(db: &Database, catalog: &dyn CatalogClient) -> Result<LegacyLoadSummary, VigiloError> {
    let patterns = catalog.fetch_attack_patterns().await?;
    let mut summary = LegacyLoadSummary {
        total: patterns.len(),
        ..Default::default()
    };

    for AttackPattern {
        external_code,
        name,
        description,
        tactics,
    } in patterns
    {
        if db
            .create_technique_if_missing(&external_code, &name, &tactics, description.as_deref())
            .await?
        {
            summary.created += 1;
        }
    }

    Ok(summary)
}

/// Outcome of one MITRE catalog sync pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncSummary {
    pub total: usize,
    pub created: u32,
    pub updated: u32,
}

/// Phase 2 of MITRE sync: fetches the STIX bundle and upserts every
/// attack-pattern into the technique catalog, grounded on
/// `mitre_sync.sync_mitre_from_github` (create-and-update every object,
/// not just missing ones).
pub async fn sync_catalog(db: &Database, catalog: &dyn CatalogClient) -> Result<SyncSummary, VigiloError> {
    let patterns = catalog.fetch_attack_patterns().await?;
    let mut summary = SyncSummary {
        total: patterns.len(),
        ..Default::default()
    };

    for AttackPattern {
        external_code,
        name,
        description,
        tactics,
    } in patterns
    {
        let (created, updated) = db
            .upsert_technique(&external_code, &name, &tactics, description.as_deref())
            .await?;
        if created {
            summary.created += 1;
        } else if updated {
            summary.updated += 1;
        }
    }

    Ok(summary)
}
