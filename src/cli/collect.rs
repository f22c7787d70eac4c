use tracing::info;

use vigilo::config::AppConfig;
use vigilo::db::Database;
use vigilo::errors::VigiloError;
use vigilo::feed::HttpFeedClient;
use vigilo::ledger;
use vigilo::runner;

use crate::cli::commands::CollectArgs;

pub async fn handle_collect(config: AppConfig, args: CollectArgs) -> Result<(), VigiloError> {
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    let feed = HttpFeedClient::new(&config.vt_api_key);

    let job = ledger::start_collection_job(&db, "manual").await?;

    let result = runner::run_collection(&db, &feed, &config, |processed, total, detail| {
        if args.verbose_progress {
            println!("[{processed}/{total}] {detail}");
        }
    })
    .await;

    match result {
        Ok(summary) => {
            info!(?summary, "collection run complete");
            ledger::finish_collection_job(&db, job.id, &summary).await?;
        }
        Err(e) => {
            ledger::finish_job_error(&db, job.id, &e.to_string()).await?;
            return Err(e);
        }
    }

    Ok(())
}
