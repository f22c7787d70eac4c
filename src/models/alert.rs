use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::event::EventType;

/// Severity assigned to an emitted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }

    /// Severity map for the Alert Debouncer: NEW -> HIGH, REACTIVATED ->
    /// MEDIUM, DISAPPEARED -> LOW.
    pub fn for_event(event_type: EventType) -> Self {
        match event_type {
            EventType::New => Severity::High,
            EventType::Reactivated => Severity::Medium,
            EventType::Disappeared => Severity::Low,
        }
    }
}

/// A surfaced alert. `actor_id`/`technique_id` are null for Risk Evaluator
/// alerts (country-level, no single actor/technique responsible).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: i64,
    pub actor_id: Option<i64>,
    pub technique_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub created_at: DateTime<Utc>,
}

/// Debouncer bookkeeping row, unique per (actor, technique, event_type).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertState {
    pub id: i64,
    pub actor_id: i64,
    pub technique_id: i64,
    pub event_type: String,
    pub last_alert_at: DateTime<Utc>,
}
