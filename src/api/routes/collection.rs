use axum::extract::State;
use axum::Json;

use crate::api::models::{CollectionRunResponse, CollectionSummaryView};
use crate::api::AppState;
use crate::errors::VigiloError;
use crate::ledger;
use crate::runner;

/// Manual trigger for a collection run (spec §4.6). Runs synchronously on
/// the request task; the scheduler's background dispatch is the
/// production path, this is for operator-initiated runs.
pub async fn trigger_collection(State(state): State<AppState>) -> Result<Json<CollectionRunResponse>, VigiloError> {
    let job = ledger::start_collection_job(&state.db, "manual").await?;

    let summary = runner::run_collection(&state.db, state.feed.as_ref(), &state.config, |_, _, _| {}).await;

    let summary = match summary {
        Ok(summary) => {
            ledger::finish_collection_job(&state.db, job.id, &summary).await?;
            summary
        }
        Err(e) => {
            ledger::finish_job_error(&state.db, job.id, &e.to_string()).await?;
            return Err(e);
        }
    };

    Ok(Json(CollectionRunResponse {
        job_id: job.id,
        summary: CollectionSummaryView::from(&summary),
    }))
}
