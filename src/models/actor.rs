use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named threat-actor entity tracked by the system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ThreatActor {
    pub id: i64,
    pub name: String,
    pub external_id: Option<String>,
    pub country: Option<String>,
    pub aliases: Option<String>,
    pub source: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
