use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton row driving the collection scheduler. Lazily created on first
/// read with defaults: `06:00`, weekdays, enabled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleConfig {
    pub id: i64,
    pub time_hhmm: String,
    /// Comma-separated lowercase three-letter weekday codes, e.g. `mon,tue`.
    pub days: String,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub running: bool,
    pub lock_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleConfig {
    pub fn day_list(&self) -> Vec<&str> {
        self.days.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
    }
}

/// Singleton row driving the MITRE reference sync scheduler. Lazily created
/// on first read with defaults: `sun` `03:00`, enabled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MitreSyncConfig {
    pub id: i64,
    pub day_of_week: String,
    pub time_hhmm: String,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub running: bool,
    pub lock_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
