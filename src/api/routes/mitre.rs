use axum::extract::State;
use axum::Json;

use crate::api::models::MitreSyncResponse;
use crate::api::AppState;
use crate::catalog;
use crate::errors::VigiloError;
use crate::ledger;

/// Manual trigger for a MITRE catalog sync (spec §4.4/§4.7).
pub async fn trigger_mitre_sync(State(state): State<AppState>) -> Result<Json<MitreSyncResponse>, VigiloError> {
    let job = ledger::start_mitre_sync_job(&state.db, "manual").await?;

    let summary = catalog::sync_catalog(&state.db, state.catalog.as_ref()).await;
    let summary = match summary {
        Ok(summary) => {
            let details = format!(
                "stix_sync: total={} created={} updated={}",
                summary.total, summary.created, summary.updated
            );
            ledger::finish_job_success(&state.db, job.id, &details).await?;
            summary
        }
        Err(e) => {
            let details = format!("stix_sync failed: {e}");
            ledger::finish_job_error(&state.db, job.id, &details).await?;
            return Err(e);
        }
    };

    Ok(Json(MitreSyncResponse {
        job_id: job.id,
        total: summary.total,
        created: summary.created,
        updated: summary.updated,
    }))
}
