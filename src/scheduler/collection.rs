use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::db::Database;
use crate::feed::FeedClient;
use crate::ledger;
use crate::runner;

use super::lease::{already_ran_this_slot, hhmm, weekday_code};

const TICK_INTERVAL: StdDuration = StdDuration::from_secs(30);
const STARTUP_DELAY: StdDuration = StdDuration::from_secs(5);
const LEASE_DURATION: Duration = Duration::minutes(30);

/// Drives the collection scheduler loop (spec §4.7). Runs until the
/// process shuts down; never returns early on error.
pub async fn run_collection_scheduler(db: Database, feed: Arc<dyn FeedClient>, config: Arc<AppConfig>) {
    tokio::time::sleep(STARTUP_DELAY).await;
    let guard = Arc::new(Mutex::new(()));
    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        interval.tick().await;
        if let Err(e) = tick(&db, feed.clone(), config.clone(), guard.clone()).await {
            error!(error = %e, "collection scheduler tick failed");
        }
    }
}

async fn tick(
    db: &Database,
    feed: Arc<dyn FeedClient>,
    config: Arc<AppConfig>,
    guard: Arc<Mutex<()>>,
) -> Result<(), crate::errors::VigiloError> {
    let cfg = db.load_schedule_config().await?;
    let now = Utc::now();

    if !cfg.enabled {
        return Ok(());
    }
    if !cfg.day_list().contains(&weekday_code(now)) {
        return Ok(());
    }
    if hhmm(now) != cfg.time_hhmm {
        return Ok(());
    }
    if already_ran_this_slot(cfg.last_run_at, now) {
        return Ok(());
    }

    let _dispatch_guard = guard.try_lock();
    let Ok(_permit) = _dispatch_guard else {
        warn!("collection job already dispatching in this process, skipping tick");
        return Ok(());
    };

    let lock_until = now + LEASE_DURATION;
    if !db.acquire_schedule_lease(cfg.id, lock_until).await? {
        info!("collection lease held by another worker, skipping");
        return Ok(());
    }

    let db = db.clone();
    tokio::spawn(async move {
        run_job(db, feed, config, cfg.id).await;
    });

    Ok(())
}

async fn run_job(db: Database, feed: Arc<dyn FeedClient>, config: Arc<AppConfig>, schedule_id: i64) {
    let job = match ledger::start_collection_job(&db, "scheduler").await {
        Ok(job) => job,
        Err(e) => {
            error!(error = %e, "failed to start collection job run");
            let _ = db.release_schedule_lease(schedule_id, Utc::now()).await;
            return;
        }
    };

    let result = runner::run_collection(&db, feed.as_ref(), &config, |_, _, _| {}).await;

    match result {
        Ok(summary) => {
            if let Err(e) = ledger::finish_collection_job(&db, job.id, &summary).await {
                error!(error = %e, "failed to finalize collection job run");
            }
        }
        Err(e) => {
            if let Err(finish_err) = ledger::finish_job_error(&db, job.id, &e.to_string()).await {
                error!(error = %finish_err, "failed to record collection job failure");
            }
        }
    }

    if let Err(e) = db.release_schedule_lease(schedule_id, Utc::now()).await {
        error!(error = %e, "failed to release collection lease");
    }
}
