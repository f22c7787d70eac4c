use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Collector,
    ActorScan,
    MitreSync,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Collector => "collector",
            JobType::ActorScan => "actor_scan",
            JobType::MitreSync => "mitre_sync",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTrigger {
    Manual,
    Scheduler,
}

impl JobTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobTrigger::Manual => "manual",
            JobTrigger::Scheduler => "scheduler",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Running,
    Success,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "RUNNING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Error => "ERROR",
        }
    }
}

/// A persistent per-run record. Exposed so operators can observe any
/// background or manual execution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRun {
    pub id: i64,
    pub job_type: String,
    pub trigger: String,
    pub status: String,
    pub actor_id: Option<i64>,
    pub actor_name: Option<String>,
    pub total_items: i32,
    pub processed_items: i32,
    pub details: Option<String>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Error text is truncated to this many characters before being persisted
/// (spec.md §7 "truncated to 1000 characters").
pub const JOB_ERROR_MAX_LEN: usize = 1000;

pub fn truncate_error(msg: &str) -> String {
    if msg.chars().count() <= JOB_ERROR_MAX_LEN {
        msg.to_string()
    } else {
        msg.chars().take(JOB_ERROR_MAX_LEN).collect()
    }
}
