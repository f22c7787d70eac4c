use chrono::{DateTime, Utc};

use crate::errors::VigiloError;
use crate::models::{EventType, IntelligenceEvent};

use super::Database;

impl Database {
    /// The canonical per-actor timeline, ordered ascending by `created_at`
    /// (spec §9 Design Notes: the one function every consumer uses).
    pub async fn actor_timeline(&self, actor_id: i64) -> Result<Vec<IntelligenceEvent>, VigiloError> {
        let events = sqlx::query_as::<_, IntelligenceEvent>(
            "SELECT id, actor_id, technique_id, event_type, created_at
             FROM intelligence_events WHERE actor_id = $1 ORDER BY created_at ASC",
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn count_events_since(
        &self,
        technique_id: i64,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> Result<i64, VigiloError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM intelligence_events
             WHERE technique_id = $1 AND event_type = $2 AND created_at >= $3",
        )
        .bind(technique_id)
        .bind(event_type.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
