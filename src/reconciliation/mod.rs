pub mod thresholds;
pub mod timeline;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use sqlx::Postgres;
use tracing::{info, warn};

use crate::alerts::maybe_alert;
use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::VigiloError;
use crate::feed::{FeedClient, FetchStatus};
use crate::models::{EventType, Technique, ThreatActor};

pub use timeline::actor_timeline;

/// Outcome of reconciling one actor (spec §4.3, mirrors
/// `gti_collector.update_actor_ttps`'s return dict).
#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    pub status: Status,
    pub source: String,
    pub total: usize,
    pub new_confirmed: u32,
    pub new_pending: u32,
    pub reactivated: u32,
    pub disabled: u32,
    pub missing_mitre: u32,
    pub evidence_added: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

impl ReconciliationOutcome {
    fn error(status: Status, error: impl Into<String>) -> Self {
        Self {
            status,
            source: String::new(),
            total: 0,
            new_confirmed: 0,
            new_pending: 0,
            reactivated: 0,
            disabled: 0,
            missing_mitre: 0,
            evidence_added: 0,
            error: Some(error.into()),
        }
    }
}

const FILES_FALLBACK_SOURCE: &str = "files_behaviour_mitre_trees";
const PRIMARY_SOURCE: &str = "attack_techniques";

/// Reconciles one actor's technique state against the feed (spec §4.3).
/// Runs under a single Postgres transaction per actor so observers never
/// see a partially-updated state (the ordering guarantee in spec §5).
pub async fn reconcile_actor(
    db: &Database,
    feed: &dyn FeedClient,
    config: &AppConfig,
    actor: &ThreatActor,
    now: DateTime<Utc>,
) -> Result<ReconciliationOutcome, VigiloError> {
    let Some(collection_id) = feed
        .resolve_collection(&actor.name, actor.external_id.as_deref())
        .await?
    else {
        return Ok(ReconciliationOutcome::error(Status::NotFound, "NOT_FOUND"));
    };

    let (mut techniques, status) = feed.fetch_techniques(&collection_id).await?;
    if status == FetchStatus::Transient {
        warn!(actor = %actor.name, "primary technique fetch transient, aborting without state change");
        return Ok(ReconciliationOutcome::error(Status::Error, "ERROR"));
    }

    let mut source = PRIMARY_SOURCE.to_string();
    let mut evidence_map: HashMap<String, HashSet<String>> = HashMap::new();

    if techniques.is_empty() {
        let (hashes, hash_status) = feed
            .fetch_file_hashes(&collection_id, config.vt_files_fallback_limit)
            .await?;
        if hash_status == FetchStatus::Transient {
            return Ok(ReconciliationOutcome::error(Status::Error, "FILES_FALLBACK_ERROR"));
        }
        let mut fallback: HashSet<String> = HashSet::new();
        for hash in &hashes {
            let tree = feed.fetch_file_mitre_tree(hash).await;
            for code in &tree {
                fallback.insert(code.clone());
                evidence_map.entry(code.clone()).or_default().insert(hash.clone());
            }
        }
        if !fallback.is_empty() {
            techniques = fallback.into_iter().collect();
            source = FILES_FALLBACK_SOURCE.to_string();
        }
    }

    info!(actor = %actor.name, count = techniques.len(), %source, "techniques fetched");

    let mut tx = db.pool().begin().await?;

    let mut seen_ids: Vec<i64> = Vec::new();
    let mut new_confirmed = 0u32;
    let mut new_pending = 0u32;
    let mut reactivated = 0u32;
    let mut missing_mitre = 0u32;
    let mut evidence_added = 0u32;

    for code in &techniques {
        let technique: Option<Technique> = sqlx::query_as(
            "SELECT id, external_code, display_name, tactics, description FROM techniques WHERE external_code = $1",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(technique) = technique else {
            missing_mitre += 1;
            continue;
        };
        seen_ids.push(technique.id);

        let existing: Option<(i64, DateTime<Utc>, bool, i32, i32, Option<bool>)> = sqlx::query_as(
            "SELECT id, last_seen, active, sightings_count, seen_days_count, new_alert_sent
             FROM actor_techniques WHERE actor_id = $1 AND technique_id = $2",
        )
        .bind(actor.id)
        .bind(technique.id)
        .fetch_optional(&mut *tx)
        .await?;

        let tactics = technique.tactic_list();
        let (min_sightings, min_days) = config.thresholds_for(&technique.external_code, &tactics);

        match existing {
            None => {
                sqlx::query(
                    "INSERT INTO actor_techniques
                        (actor_id, technique_id, first_seen, last_seen, last_collected, active,
                         sightings_count, seen_days_count, new_alert_sent)
                     VALUES ($1, $2, $3, $3, $3, TRUE, 1, 1, FALSE)",
                )
                .bind(actor.id)
                .bind(technique.id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                new_pending += 1;

                if min_sightings <= 1 && min_days <= 1 {
                    confirm_new(&mut tx, actor, &technique, now, 1, min_sightings, 1, min_days, &source).await?;
                    new_confirmed += 1;
                    new_pending -= 1;
                }
            }
            Some((row_id, prev_last_seen, was_active, sightings_count, seen_days_count, new_alert_sent)) => {
                if new_alert_sent.is_none() {
                    sqlx::query(
                        "UPDATE actor_techniques SET new_alert_sent = TRUE WHERE id = $1 AND new_alert_sent IS NULL",
                    )
                    .bind(row_id)
                    .execute(&mut *tx)
                    .await?;
                }
                let already_alerted = new_alert_sent.unwrap_or(true);

                let new_distinct_day = prev_last_seen.date_naive() != now.date_naive();
                sqlx::query(
                    "UPDATE actor_techniques SET
                         last_seen = $2, last_collected = $2, active = TRUE,
                         sightings_count = sightings_count + 1,
                         seen_days_count = seen_days_count + CASE WHEN $3 THEN 1 ELSE 0 END
                     WHERE id = $1",
                )
                .bind(row_id)
                .bind(now)
                .bind(new_distinct_day)
                .execute(&mut *tx)
                .await?;

                let sightings = sightings_count + 1;
                let seen_days = seen_days_count + if new_distinct_day { 1 } else { 0 };

                if !was_active {
                    sqlx::query(
                        "INSERT INTO intelligence_events (actor_id, technique_id, event_type, created_at)
                         VALUES ($1, $2, 'REACTIVATED', $3)",
                    )
                    .bind(actor.id)
                    .bind(technique.id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                    maybe_alert(
                        &mut tx,
                        actor,
                        &technique,
                        EventType::Reactivated,
                        "Technique reactivated after inactivity",
                        now,
                    )
                    .await?;
                    reactivated += 1;
                } else if !already_alerted && sightings >= min_sightings && seen_days >= min_days {
                    confirm_new(&mut tx, actor, &technique, now, sightings, min_sightings, seen_days, min_days, &source)
                        .await?;
                    new_confirmed += 1;
                }
            }
        }

        // Evidence capture (spec §4.3) is a sibling of confirmation, not
        // nested inside it: every fallback-sourced code with observed
        // hashes gets its evidence rows regardless of whether this
        // iteration confirmed, reactivated, or merely recorded a sighting.
        if source == FILES_FALLBACK_SOURCE {
            evidence_added +=
                store_evidence(&mut tx, actor.id, technique.id, evidence_map.get(code), &source, now).await?;
        }
    }

    let disappeared: Vec<(i64, i64)> = sqlx::query_as(
        "UPDATE actor_techniques SET active = FALSE
         WHERE actor_id = $1 AND active = TRUE AND NOT (technique_id = ANY($2))
         RETURNING id, technique_id",
    )
    .bind(actor.id)
    .bind(&seen_ids)
    .fetch_all(&mut *tx)
    .await?;

    for (_, technique_id) in &disappeared {
        let technique: Technique = sqlx::query_as(
            "SELECT id, external_code, display_name, tactics, description FROM techniques WHERE id = $1",
        )
        .bind(technique_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO intelligence_events (actor_id, technique_id, event_type, created_at)
             VALUES ($1, $2, 'DISAPPEARED', $3)",
        )
        .bind(actor.id)
        .bind(technique_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        maybe_alert(
            &mut tx,
            actor,
            &technique,
            EventType::Disappeared,
            "Technique no longer observed in current collection window",
            now,
        )
        .await?;
    }

    tx.commit().await?;

    Ok(ReconciliationOutcome {
        status: Status::Ok,
        source,
        total: techniques.len(),
        new_confirmed,
        new_pending,
        reactivated,
        disabled: disappeared.len() as u32,
        missing_mitre,
        evidence_added,
        error: None,
    })
}

#[allow(clippy::too_many_arguments)]
async fn confirm_new(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    actor: &ThreatActor,
    technique: &Technique,
    now: DateTime<Utc>,
    sightings: i32,
    min_sightings: i32,
    seen_days: i32,
    min_days: i32,
    source: &str,
) -> Result<(), VigiloError> {
    sqlx::query("UPDATE actor_techniques SET new_alert_sent = TRUE WHERE actor_id = $1 AND technique_id = $2")
        .bind(actor.id)
        .bind(technique.id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        "INSERT INTO intelligence_events (actor_id, technique_id, event_type, created_at)
         VALUES ($1, $2, 'NEW', $3)",
    )
    .bind(actor.id)
    .bind(technique.id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    let context = format!(
        "NEW confirmed ({sightings}/{min_sightings} observations, {seen_days}/{min_days} days). source={source}"
    );
    maybe_alert(tx, actor, technique, EventType::New, &context, now).await?;
    Ok(())
}

async fn store_evidence(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    actor_id: i64,
    technique_id: i64,
    hashes: Option<&HashSet<String>>,
    source: &str,
    observed_at: DateTime<Utc>,
) -> Result<u32, VigiloError> {
    let Some(hashes) = hashes else { return Ok(0) };
    let mut inserted = 0u32;
    for hash in hashes {
        let result = sqlx::query(
            "INSERT INTO technique_evidence (actor_id, technique_id, sample_hash, source, observed_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (actor_id, technique_id, sample_hash) DO NOTHING",
        )
        .bind(actor_id)
        .bind(technique_id)
        .bind(hash)
        .bind(source)
        .bind(observed_at)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }
    Ok(inserted)
}
