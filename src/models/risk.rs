use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A point-in-time country risk record. Append-only time series per country.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CountryRiskSnapshot {
    pub id: i64,
    pub country: String,
    pub risk_score: f64,
    pub technique_count: i32,
    pub actor_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A single technique's contribution to a country's risk, as computed by
/// the Risk Evaluator (see `crate::risk`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueRisk {
    pub technique_code: String,
    pub technique_name: String,
    pub risk: f64,
}
