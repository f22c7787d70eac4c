use chrono::Utc;
use tracing::info;

use vigilo::config::AppConfig;
use vigilo::db::Database;
use vigilo::errors::VigiloError;
use vigilo::feed::HttpFeedClient;
use vigilo::ledger;
use vigilo::reconciliation;

use crate::cli::commands::ScanActorArgs;

/// Reconciles a single named actor on demand (spec §4.3), bypassing the
/// per-actor throttle since this is an operator-initiated scan.
pub async fn handle_scan_actor(config: AppConfig, args: ScanActorArgs) -> Result<(), VigiloError> {
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    let feed = HttpFeedClient::new(&config.vt_api_key);

    let actors = db.list_active_actors().await?;
    let actor = actors
        .into_iter()
        .find(|a| a.name.eq_ignore_ascii_case(&args.name))
        .ok_or_else(|| VigiloError::NotFound(format!("actor {}", args.name)))?;

    let job = ledger::start_scan_job(&db, "manual", actor.id, &actor.name).await?;

    match reconciliation::reconcile_actor(&db, &feed, &config, &actor, Utc::now()).await {
        Ok(outcome) => {
            info!(?outcome, "actor reconciled");
            let details = format!(
                "status={:?} source={} total={} new_confirmed={} reactivated={} disabled={}",
                outcome.status, outcome.source, outcome.total, outcome.new_confirmed, outcome.reactivated, outcome.disabled
            );
            ledger::finish_job_success(&db, job.id, &details).await?;
        }
        Err(e) => {
            ledger::finish_job_error(&db, job.id, &e.to_string()).await?;
            return Err(e);
        }
    }

    Ok(())
}
