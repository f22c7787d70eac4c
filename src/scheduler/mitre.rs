use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::catalog::{self, CatalogClient};
use crate::db::Database;
use crate::ledger;

use super::lease::{already_ran_this_slot, hhmm, weekday_code};

const TICK_INTERVAL: StdDuration = StdDuration::from_secs(60);
const STARTUP_DELAY: StdDuration = StdDuration::from_secs(5);
const LEASE_DURATION: Duration = Duration::minutes(60);

/// Drives the MITRE catalog sync scheduler loop (spec §4.7).
pub async fn run_mitre_scheduler(db: Database, catalog: Arc<dyn CatalogClient>) {
    tokio::time::sleep(STARTUP_DELAY).await;
    let guard = Arc::new(Mutex::new(()));
    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        interval.tick().await;
        if let Err(e) = tick(&db, catalog.clone(), guard.clone()).await {
            error!(error = %e, "mitre scheduler tick failed");
        }
    }
}

async fn tick(db: &Database, catalog: Arc<dyn CatalogClient>, guard: Arc<Mutex<()>>) -> Result<(), crate::errors::VigiloError> {
    let cfg = db.load_mitre_sync_config().await?;
    let now = Utc::now();

    if !cfg.enabled {
        return Ok(());
    }
    if weekday_code(now) != cfg.day_of_week {
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
        warn!("mitre sync already dispatching in this process, skipping tick");
        return Ok(());
    };

    let lock_until = now + LEASE_DURATION;
    if !db.acquire_mitre_lease(cfg.id, lock_until).await? {
        info!("mitre lease held by another worker, skipping");
        return Ok(());
    }

    let db = db.clone();
    tokio::spawn(async move {
        run_job(db, catalog, cfg.id).await;
    });

    Ok(())
}

async fn run_job(db: Database, catalog: Arc<dyn CatalogClient>, schedule_id: i64) {
    let job = match ledger::start_mitre_sync_job(&db, "scheduler").await {
        Ok(job) => job,
        Err(e) => {
            error!(error = %e, "failed to start mitre sync job run");
            let _ = db.release_mitre_lease(schedule_id, Utc::now()).await;
            return;
        }
    };

    let legacy = match catalog::legacy_load(&db, catalog.as_ref()).await {
        Ok(summary) => summary,
        Err(e) => {
            let details = format!("legacy_load failed: {e}");
            if let Err(finish_err) = ledger::finish_job_error(&db, job.id, &details).await {
                error!(error = %finish_err, "failed to record mitre sync job failure");
            }
            let _ = db.release_mitre_lease(schedule_id, Utc::now()).await;
            return;
        }
    };

    let result = catalog::sync_catalog(&db, catalog.as_ref()).await;

    match result {
        Ok(summary) => {
            let details = format!(
                "legacy_load: total={} created={}; stix_sync: total={} created={} updated={}",
                legacy.total, legacy.created, summary.total, summary.created, summary.updated
            );
            if let Err(e) = ledger::finish_job_success(&db, job.id, &details).await {
                error!(error = %e, "failed to finalize mitre sync job run");
            }
        }
        Err(e) => {
            let details = format!("stix_sync failed: {e}");
            if let Err(finish_err) = ledger::finish_job_error(&db, job.id, &details).await {
                error!(error = %finish_err, "failed to record mitre sync job failure");
            }
        }
    }

    if let Err(e) = db.release_mitre_lease(schedule_id, Utc::now()).await {
        error!(error = %e, "failed to release mitre lease");
    }
}
