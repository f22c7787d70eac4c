use vigilo::config::AppConfig;

pub fn handle_validate(config: &AppConfig) {
    println!("Configuration is valid.");
    println!("  database_url: {}", mask(&config.database_url));
    println!("  vt_api_key: {}", mask(&config.vt_api_key));
    println!("  vt_files_fallback_limit: {}", config.vt_files_fallback_limit);
    println!("  vt_scan_min_interval_minutes: {}", config.vt_scan_min_interval_minutes);
    println!(
        "  new_alert thresholds: {}/{} sightings/days",
        config.new_alert_min_sightings, config.new_alert_min_distinct_days
    );
    println!("  watchlist_techniques: {}", config.watchlist_techniques.join(","));
    println!(
        "  watchlist thresholds: {}/{} sightings/days",
        config.watchlist_min_sightings, config.watchlist_min_distinct_days
    );
    println!("  tactic_threshold_overrides: {} entries", config.tactic_threshold_overrides.len());
}

fn mask(value: &str) -> String {
    if value.len() <= 4 {
        "*".repeat(value.len())
    } else {
        format!("{}***", &value[..4])
    }
}
