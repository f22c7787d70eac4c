use std::collections::HashMap;

/// The one environment frame the engine reads (spec §6). Loaded once at
/// startup by [`super::parser::load_config`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub vt_api_key: String,
    pub vt_files_fallback_limit: u32,
    pub vt_scan_min_interval_minutes: i64,
    pub new_alert_min_sightings: i32,
    pub new_alert_min_distinct_days: i32,
    pub watchlist_techniques: Vec<String>,
    pub watchlist_min_sightings: i32,
    pub watchlist_min_distinct_days: i32,
    /// Parsed `tactic -> (min_sightings, min_distinct_days)` overrides.
    pub tactic_threshold_overrides: HashMap<String, (i32, i32)>,
}

impl AppConfig {
    /// Threshold priority per spec §4.3/§9: watchlist > tactic override >
    /// default. `tactics` is the technique's tactic list (lowercase,
    /// kill-chain-phase names).
    pub fn thresholds_for(&self, technique_code: &str, tactics: &[&str]) -> (i32, i32) {
        if self
            .watchlist_techniques
            .iter()
            .any(|t| t.eq_ignore_ascii_case(technique_code))
        {
            return (self.watchlist_min_sightings, self.watchlist_min_distinct_days);
        }
        let matches: Vec<(i32, i32)> = tactics
            .iter()
            .filter_map(|t| self.tactic_threshold_overrides.get(&t.to_lowercase()).copied())
            .collect();
        if !matches.is_empty() {
            let min_sightings = matches.iter().map(|&(s, _)| s).min().unwrap();
            let min_days = matches.iter().map(|&(_, d)| d).min().unwrap();
            return (min_sightings, min_days);
        }
        (self.new_alert_min_sightings, self.new_alert_min_distinct_days)
    }
}
