pub mod actor;
pub mod alert;
pub mod event;
pub mod job;
pub mod risk;
pub mod schedule;
pub mod technique;

pub use actor::ThreatActor;
pub use alert::{Alert, AlertState, Severity};
pub use event::{EventType, IntelligenceEvent};
pub use job::{JobRun, JobStatus, JobTrigger, JobType};
pub use risk::CountryRiskSnapshot;
pub use schedule::{MitreSyncConfig, ScheduleConfig};
pub use technique::{ActorTechnique, Technique, TechniqueEvidence};
