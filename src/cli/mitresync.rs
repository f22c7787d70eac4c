use tracing::info;

use vigilo::catalog::{self, HttpCatalogClient};
use vigilo::config::AppConfig;
use vigilo::db::Database;
use vigilo::errors::VigiloError;
use vigilo::ledger;

pub async fn handle_mitre_sync(config: AppConfig) -> Result<(), VigiloError> {
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    let client = HttpCatalogClient::new();

    let job = ledger::start_mitre_sync_job(&db, "manual").await?;

    let legacy = match catalog::legacy_load(&db, &client).await {
        Ok(summary) => summary,
        Err(e) => {
            let details = format!("legacy_load failed: {e}");
            ledger::finish_job_error(&db, job.id, &details).await?;
            return Err(e);
        }
    };

    match catalog::sync_catalog(&db, &client).await {
        Ok(summary) => {
            info!(
                legacy_total = legacy.total,
                legacy_created = legacy.created,
                total = summary.total,
                created = summary.created,
                updated = summary.updated,
                "mitre sync complete"
            );
            let details = format!(
                "legacy_load: total={} created={}; stix_sync: total={} created={} updated={}",
                legacy.total, legacy.created, summary.total, summary.created, summary.updated
            );
            ledger::finish_job_success(&db, job.id, &details).await?;
        }
        Err(e) => {
            let details = format!("stix_sync failed: {e}");
            ledger::finish_job_error(&db, job.id, &details).await?;
            return Err(e);
        }
    }

    Ok(())
}
