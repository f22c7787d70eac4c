//! Confirmation threshold resolution (spec §4.3): watchlist takes
//! priority, then the minimum across any matching tactic overrides, then
//! the global default. The resolution itself lives on
//! [`crate::config::AppConfig::thresholds_for`] since it is pure
//! configuration lookup; this module re-exports it under the
//! reconciliation-facing name and carries the scenario-level tests.

pub use crate::config::AppConfig;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::config::AppConfig;

    fn config(watchlist: &[&str], overrides: &[(&str, (i32, i32))]) -> AppConfig {
        AppConfig {
            database_url: String::new(),
            vt_api_key: String::new(),
            vt_files_fallback_limit: 40,
            vt_scan_min_interval_minutes: 60,
            new_alert_min_sightings: 3,
            new_alert_min_distinct_days: 2,
            watchlist_techniques: watchlist.iter().map(|s| s.to_string()).collect(),
            watchlist_min_sightings: 1,
            watchlist_min_distinct_days: 1,
            tactic_threshold_overrides: overrides.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
        }
    }

    #[test]
    fn watchlist_wins_over_everything() {
        let cfg = config(&["T1059"], &[("execution", (5, 5))]);
        assert_eq!(cfg.thresholds_for("T1059", &["execution"]), (1, 1));
    }

    #[test]
    fn scenario_e_tactic_override_takes_minimum_across_tactics() {
        let cfg = config(&[], &[("initial-access", (2, 1)), ("persistence", (5, 3))]);
        assert_eq!(cfg.thresholds_for("T1078", &["initial-access", "persistence"]), (2, 1));
    }

    #[test]
    fn default_applies_with_no_matches() {
        let cfg = config(&[], &[]);
        assert_eq!(cfg.thresholds_for("T9999", &["execution"]), (3, 2));
    }

    #[test]
    fn unrelated_overrides_map() {
        let mut overrides = HashMap::new();
        overrides.insert("discovery".to_string(), (4, 3));
        let cfg = AppConfig {
            tactic_threshold_overrides: overrides,
            ..config(&[], &[])
        };
        assert_eq!(cfg.thresholds_for("T1059", &["execution"]), (3, 2));
    }
}
