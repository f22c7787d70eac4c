use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::VigiloError;
use crate::feed::FeedClient;
use crate::reconciliation::{self, Status};
use crate::risk;

/// Summary returned by [`run_collection`] (spec §4.6 step 5).
#[derive(Debug, Clone, Default)]
pub struct CollectionSummary {
    pub total_actors: usize,
    pub processed: usize,
    pub scanned: usize,
    pub skipped: usize,
    pub errors: usize,
    pub countries_evaluated: usize,
}

/// Iterates active actors, applies the per-actor throttle, runs
/// reconciliation, then evaluates risk for every country touched by a
/// successful reconciliation (spec §4.6). `on_progress` receives
/// `(processed, total, detail)` after each actor, mirroring
/// `run_collection`'s `progress_callback`.
pub async fn run_collection<F>(
    db: &Database,
    feed: &dyn FeedClient,
    config: &AppConfig,
    mut on_progress: F,
) -> Result<CollectionSummary, VigiloError>
where
    F: FnMut(usize, usize, &str),
{
    let actors = db.list_active_actors().await?;
    let total_actors = actors.len();
    let now = Utc::now();

    let mut summary = CollectionSummary {
        total_actors,
        ..Default::default()
    };
    let mut affected_countries: HashSet<String> = HashSet::new();

    for actor in &actors {
        summary.processed += 1;

        if !should_scan_actor(db, actor.id, now, config).await? {
            summary.skipped += 1;
            on_progress(summary.processed, total_actors, &format!("skip:{}", actor.name));
            continue;
        }

        let outcome = reconciliation::reconcile_actor(db, feed, config, actor, now).await;
        summary.scanned += 1;

        match outcome {
            Ok(result) => {
                info!(actor = %actor.name, ?result.status, total = result.total, "actor reconciled");
                on_progress(
                    summary.processed,
                    total_actors,
                    &format!("scan:{}:{:?}", actor.name, result.status),
                );
                if result.status == Status::Ok {
                    if let Some(country) = &actor.country {
                        affected_countries.insert(country.clone());
                    }
                } else {
                    summary.errors += 1;
                }
            }
            Err(e) => {
                error!(actor = %actor.name, error = %e, "reconciliation failed");
                summary.errors += 1;
                on_progress(summary.processed, total_actors, &format!("scan:{}:error", actor.name));
            }
        }
    }

    for country in &affected_countries {
        risk::store_snapshot(db, country, now).await?;
        risk::detect_risk_change(db, country, now).await?;
    }
    summary.countries_evaluated = affected_countries.len();

    Ok(summary)
}

/// Per-actor throttle (spec §4.3): skip if the actor's most recent
/// `last_collected` across its techniques is within the configured
/// interval. A non-positive interval disables throttling.
async fn should_scan_actor(
    db: &Database,
    actor_id: i64,
    now: DateTime<Utc>,
    config: &AppConfig,
) -> Result<bool, VigiloError> {
    if config.vt_scan_min_interval_minutes <= 0 {
        return Ok(true);
    }
    let Some(last_collected) = db.max_last_collected(actor_id).await? else {
        return Ok(true);
    };
    let interval = Duration::minutes(config.vt_scan_min_interval_minutes);
    Ok(now - last_collected >= interval)
}
