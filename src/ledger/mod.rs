use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::db::Database;
use crate::errors::VigiloError;
use crate::models::{JobRun, JobType};
use crate::runner::CollectionSummary;

/// Starts a `collector` job run (spec §4.7 job ledger).
pub async fn start_collection_job(db: &Database, trigger: &str) -> Result<JobRun, VigiloError> {
    db.start_job(JobType::Collector.as_str(), trigger, None, None, 0).await
}

/// Starts a `mitre_sync` job run.
pub async fn start_mitre_sync_job(db: &Database, trigger: &str) -> Result<JobRun, VigiloError> {
    db.start_job(JobType::MitreSync.as_str(), trigger, None, None, 0).await
}

/// Starts a single-actor `actor_scan` job run.
pub async fn start_scan_job(db: &Database, trigger: &str, actor_id: i64, actor_name: &str) -> Result<JobRun, VigiloError> {
    db.start_job(JobType::ActorScan.as_str(), trigger, Some(actor_id), Some(actor_name), 1).await
}

/// Reports incremental progress against a running job.
pub async fn report_progress(db: &Database, job_id: i64, processed_items: i32) -> Result<(), VigiloError> {
    db.update_job_progress(job_id, processed_items).await
}

/// Finalizes a collection job with a JSON summary of the run (spec §4.7).
pub async fn finish_collection_job(
    db: &Database,
    job_id: i64,
    summary: &CollectionSummary,
) -> Result<(), VigiloError> {
    let details = json!({
        "total_actors": summary.total_actors,
        "processed": summary.processed,
        "scanned": summary.scanned,
        "skipped": summary.skipped,
        "errors": summary.errors,
        "countries_evaluated": summary.countries_evaluated,
    })
    .to_string();
    db.finish_job_success(job_id, &details, Utc::now()).await
}

/// Finalizes any job with a plain-text details string (used by MITRE sync
/// and single-actor scans).
pub async fn finish_job_success(db: &Database, job_id: i64, details: &str) -> Result<(), VigiloError> {
    db.finish_job_success(job_id, details, Utc::now()).await
}

/// Records a failed job run, logging the error alongside the ledger entry.
pub async fn finish_job_error(db: &Database, job_id: i64, error_text: &str) -> Result<(), VigiloError> {
    error!(job_id, error = error_text, "job failed");
    db.finish_job_error(job_id, error_text, Utc::now()).await
}
