use chrono::{DateTime, Utc};

use crate::db::Database;
use crate::db::risk::TechniqueAdoption;
use crate::errors::VigiloError;
use crate::models::{CountryRiskSnapshot, EventType, TechniqueRisk};

const NEW_WEIGHT: f64 = 8.0;
const REACTIVATED_WEIGHT: f64 = 10.0;
const ADOPTION_WEIGHT: f64 = 5.0;
const PERSISTENCE_WEIGHT: f64 = 0.3;
const TOP_N: usize = 15;
const CHANGE_WINDOW_DAYS: i64 = 7;
const CHANGE_THRESHOLD_PCT: f64 = 15.0;

/// Computes the ranked per-technique risk for a country, capped to the
/// top 15 by risk descending (spec §4.5 steps 1-2, grounded on
/// `risk_score.calculate_risk`). Empty if the country has no active
/// actors.
pub async fn calculate_risk(db: &Database, country: &str, now: DateTime<Utc>) -> Result<Vec<TechniqueRisk>, VigiloError> {
    if !db.country_has_active_actors(country).await? {
        return Ok(Vec::new());
    }

    let since = now - chrono::Duration::days(CHANGE_WINDOW_DAYS);
    let adoptions = db.technique_adoption_for_country(country).await?;

    let mut results = Vec::with_capacity(adoptions.len());
    for TechniqueAdoption {
        technique_id,
        external_code,
        display_name,
        adoption,
        persistence_days,
    } in adoptions
    {
        let new_7d = db.count_events_since(technique_id, EventType::New, since).await?;
        let reactivated_7d = db.count_events_since(technique_id, EventType::Reactivated, since).await?;

        let risk = ADOPTION_WEIGHT * adoption as f64
            + NEW_WEIGHT * new_7d as f64
            + REACTIVATED_WEIGHT * reactivated_7d as f64
            + PERSISTENCE_WEIGHT * persistence_days;

        results.push(TechniqueRisk {
            technique_code: external_code,
            technique_name: display_name,
            risk: (risk * 100.0).round() / 100.0,
        });
    }

    results.sort_by(|a, b| b.risk.partial_cmp(&a.risk).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(TOP_N);
    Ok(results)
}

/// Stores a snapshot summing the top-15-capped risk set (spec §4.5 step 3,
/// Open Question resolved — matches `risk_tracker.store_snapshot`'s
/// `sum(r["risk"] for r in risks)` over the already-capped list). No-op
/// when the country has no active actors or no technique contributes.
pub async fn store_snapshot(db: &Database, country: &str, now: DateTime<Utc>) -> Result<Option<CountryRiskSnapshot>, VigiloError> {
    let risks = calculate_risk(db, country, now).await?;
    if risks.is_empty() {
        return Ok(None);
    }

    let total_risk: f64 = risks.iter().map(|r| r.risk).sum();
    let technique_count = risks.len() as i32;
    let actor_count = db.active_actor_count(country).await?;

    let snapshot = db
        .insert_risk_snapshot(country, total_risk, technique_count, actor_count, now)
        .await?;
    Ok(Some(snapshot))
}

/// Compares the two most recent snapshots; emits a HIGH (increase) or LOW
/// (decrease) Alert when the signed percent change is at least 15% in
/// magnitude (spec §4.5 step 4, property 7). No-op with fewer than two
/// snapshots, or when the previous snapshot's risk was zero.
pub async fn detect_risk_change(db: &Database, country: &str, now: DateTime<Utc>) -> Result<(), VigiloError> {
    let snapshots = db.recent_risk_snapshots(country).await?;
    if snapshots.len() < 2 {
        return Ok(());
    }
    let latest = &snapshots[0];
    let previous = &snapshots[1];

    if previous.risk_score == 0.0 {
        return Ok(());
    }

    let change = ((latest.risk_score - previous.risk_score) / previous.risk_score) * 100.0;
    if change.abs() < CHANGE_THRESHOLD_PCT {
        return Ok(());
    }

    let severity = if change > 0.0 { "HIGH" } else { "LOW" };
    let title = format!("Risk change detected in {country}");
    let description = format!(
        "Risk changed {change:.2}% (from {:.2} to {:.2})",
        previous.risk_score, latest.risk_score
    );

    db.insert_alert(None, None, &title, &description, severity, now).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_threshold_excludes_14_percent() {
        assert!(13.9_f64.abs() < CHANGE_THRESHOLD_PCT);
        assert!(14.0_f64.abs() < CHANGE_THRESHOLD_PCT);
    }

    #[test]
    fn change_threshold_includes_15_percent() {
        assert!(15.0_f64.abs() >= CHANGE_THRESHOLD_PCT);
    }
}
