use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// The three transitions the Reconciliation Engine can observe for an
/// (actor, technique) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    New,
    Reactivated,
    Disappeared,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::New => "NEW",
            EventType::Reactivated => "REACTIVATED",
            EventType::Disappeared => "DISAPPEARED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(EventType::New),
            "REACTIVATED" => Ok(EventType::Reactivated),
            "DISAPPEARED" => Ok(EventType::Disappeared),
            other => Err(format!("unknown event_type: {other}")),
        }
    }
}

/// An append-only record of a technique presence transition for an actor.
/// A NEW event is emitted at most once per (actor, technique) lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IntelligenceEvent {
    pub id: i64,
    pub actor_id: i64,
    pub technique_id: i64,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
}

impl IntelligenceEvent {
    pub fn kind(&self) -> EventType {
        self.event_type
            .parse()
            .expect("event_type column holds only values written by this crate")
    }
}
