use crate::db::Database;
use crate::errors::VigiloError;
use crate::models::IntelligenceEvent;

/// The one canonical per-actor timeline: all IntelligenceEvents, ordered
/// ascending by `created_at` (spec §9 Design Notes, Open Question
/// resolved — every consumer, tests and the `/jobs` read surface alike,
/// uses this function instead of re-deriving the ordering).
pub async fn actor_timeline(db: &Database, actor_id: i64) -> Result<Vec<IntelligenceEvent>, VigiloError> {
    db.actor_timeline(actor_id).await
}
