use chrono::{DateTime, Utc};

use crate::errors::VigiloError;
use crate::models::Alert;

use super::Database;

impl Database {
    pub async fn insert_alert(
        &self,
        actor_id: Option<i64>,
        technique_id: Option<i64>,
        title: &str,
        description: &str,
        severity: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Alert, VigiloError> {
        let alert = sqlx::query_as::<_, Alert>(
            "INSERT INTO alerts (actor_id, technique_id, title, description, severity, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, actor_id, technique_id, title, description, severity, created_at",
        )
        .bind(actor_id)
        .bind(technique_id)
        .bind(title)
        .bind(description)
        .bind(severity)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(alert)
    }

    pub async fn list_recent_alerts(&self, limit: i64) -> Result<Vec<Alert>, VigiloError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "SELECT id, actor_id, technique_id, title, description, severity, created_at
             FROM alerts ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }
}
