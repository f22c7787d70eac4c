use std::collections::HashMap;

use tracing::warn;

use crate::errors::VigiloError;

use super::types::AppConfig;

/// Load the environment frame (spec §6). `.env` is read first via
/// `dotenvy` if present, then `std::env` is consulted; `std::env` always
/// wins when both are set.
pub fn load_config() -> Result<AppConfig, VigiloError> {
    let _ = dotenvy::dotenv();

    let database_url = require_var("DATABASE_URL")?;
    let vt_api_key = require_var("VT_API_KEY")?;

    Ok(AppConfig {
        database_url,
        vt_api_key,
        vt_files_fallback_limit: parse_var("VT_FILES_FALLBACK_LIMIT", 40),
        vt_scan_min_interval_minutes: parse_var("VT_SCAN_MIN_INTERVAL_MINUTES", 60),
        new_alert_min_sightings: parse_var("NEW_ALERT_MIN_SIGHTINGS", 3),
        new_alert_min_distinct_days: parse_var("NEW_ALERT_MIN_DISTINCT_DAYS", 2),
        watchlist_techniques: parse_csv_list("WATCHLIST_TECHNIQUES"),
        watchlist_min_sightings: parse_var("WATCHLIST_MIN_SIGHTINGS", 1),
        watchlist_min_distinct_days: parse_var("WATCHLIST_MIN_DISTINCT_DAYS", 1),
        tactic_threshold_overrides: parse_tactic_overrides(
            &std::env::var("NEW_ALERT_TACTIC_THRESHOLD_OVERRIDES").unwrap_or_default(),
        ),
    })
}

fn require_var(key: &str) -> Result<String, VigiloError> {
    std::env::var(key).map_err(|_| VigiloError::Config(format!("missing required env var {key}")))
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_csv_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `tactic:sightings/days` comma-separated entries, e.g.
/// `initial-access:2/1,discovery:4/3`. Malformed entries are skipped with a
/// warning rather than failing startup (spec §9 Design Notes).
pub fn parse_tactic_overrides(raw: &str) -> HashMap<String, (i32, i32)> {
    let mut result = HashMap::new();
    for chunk in raw.split(',') {
        let part = chunk.trim();
        if part.is_empty() {
            continue;
        }
        let Some((tactic, values)) = part.split_once(':') else {
            warn!(entry = part, "skipping malformed tactic override (missing ':')");
            continue;
        };
        let tactic = tactic.trim().to_lowercase();
        let Some((s, d)) = values.split_once('/') else {
            warn!(entry = part, "skipping malformed tactic override (missing '/')");
            continue;
        };
        match (s.trim().parse::<i32>(), d.trim().parse::<i32>()) {
            (Ok(sightings), Ok(days)) => {
                result.insert(tactic, (sightings.max(1), days.max(1)));
            }
            _ => {
                warn!(entry = part, "skipping malformed tactic override (non-integer value)");
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_overrides() {
        let parsed = parse_tactic_overrides("initial-access:2/1,discovery:4/3");
        assert_eq!(parsed.get("initial-access"), Some(&(2, 1)));
        assert_eq!(parsed.get("discovery"), Some(&(4, 3)));
    }

    #[test]
    fn clamps_values_below_one() {
        let parsed = parse_tactic_overrides("persistence:0/-5");
        assert_eq!(parsed.get("persistence"), Some(&(1, 1)));
    }

    #[test]
    fn skips_malformed_entries() {
        let parsed = parse_tactic_overrides("no-colon-here,discovery:bad/3,,collection:1/1");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("collection"), Some(&(1, 1)));
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(parse_tactic_overrides("").is_empty());
    }
}
