use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An attack-pattern from the reference catalog, identified by a MITRE-style
/// code such as `T1059`. The authoritative copy is refreshed from the STIX
/// bundle (see `crate::catalog`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Technique {
    pub id: i64,
    pub external_code: String,
    pub display_name: String,
    /// Comma-joined, sorted, deduplicated, lowercase kill-chain phase names.
    pub tactics: String,
    pub description: Option<String>,
}

impl Technique {
    pub fn tactic_list(&self) -> Vec<&str> {
        self.tactics
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Reconciliation state for one (actor, technique) pair. One row per pair.
///
/// Invariants: `first_seen <= last_seen <= last_collected`;
/// `seen_days_count <= sightings_count`; `new_alert_sent` is write-once true
/// and never reverts back to false.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActorTechnique {
    pub id: i64,
    pub actor_id: i64,
    pub technique_id: i64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub last_collected: DateTime<Utc>,
    pub active: bool,
    pub sightings_count: i32,
    pub seen_days_count: i32,
    /// `None` means legacy pre-engine data; the first reconciliation pass
    /// sets this to `Some(true)` without emitting a retroactive NEW event.
    pub new_alert_sent: Option<bool>,
}

impl ActorTechnique {
    pub fn new_alert_sent(&self) -> bool {
        self.new_alert_sent.unwrap_or(false)
    }
}

/// One sample-hash observation backing a technique that was derived through
/// the files-fallback path. Unique per (actor, technique, sample_hash).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TechniqueEvidence {
    pub id: i64,
    pub actor_id: i64,
    pub technique_id: i64,
    pub sample_hash: String,
    pub source: String,
    pub observed_at: DateTime<Utc>,
}
