use chrono::{DateTime, Utc};

use crate::errors::VigiloError;
use crate::models::ActorTechnique;

use super::Database;

impl Database {
    pub async fn get_actor_technique(
        &self,
        actor_id: i64,
        technique_id: i64,
    ) -> Result<Option<ActorTechnique>, VigiloError> {
        let row = sqlx::query_as::<_, ActorTechnique>(
            "SELECT id, actor_id, technique_id, first_seen, last_seen, last_collected,
                    active, sightings_count, seen_days_count, new_alert_sent
             FROM actor_techniques WHERE actor_id = $1 AND technique_id = $2",
        )
        .bind(actor_id)
        .bind(technique_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_actor_techniques(&self, actor_id: i64) -> Result<Vec<ActorTechnique>, VigiloError> {
        let rows = sqlx::query_as::<_, ActorTechnique>(
            "SELECT id, actor_id, technique_id, first_seen, last_seen, last_collected,
                    active, sightings_count, seen_days_count, new_alert_sent
             FROM actor_techniques WHERE actor_id = $1",
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn max_last_collected(&self, actor_id: i64) -> Result<Option<DateTime<Utc>>, VigiloError> {
        let row: Option<(Option<DateTime<Utc>>,)> = sqlx::query_as(
            "SELECT MAX(last_collected) FROM actor_techniques WHERE actor_id = $1",
        )
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(ts,)| ts))
    }
}
