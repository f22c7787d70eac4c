use crate::errors::VigiloError;
use crate::models::ThreatActor;

use super::Database;

impl Database {
    pub async fn list_active_actors(&self) -> Result<Vec<ThreatActor>, VigiloError> {
        let actors = sqlx::query_as::<_, ThreatActor>(
            "SELECT id, name, external_id, country, aliases, source, active, created_at
             FROM threat_actors WHERE active = TRUE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(actors)
    }

    pub async fn upsert_actor(
        &self,
        name: &str,
        external_id: Option<&str>,
        country: Option<&str>,
        source: &str,
    ) -> Result<ThreatActor, VigiloError> {
        let actor = sqlx::query_as::<_, ThreatActor>(
            "INSERT INTO threat_actors (name, external_id, country, source)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (name) DO UPDATE SET
                 external_id = COALESCE(EXCLUDED.external_id, threat_actors.external_id),
                 country = COALESCE(EXCLUDED.country, threat_actors.country)
             RETURNING id, name, external_id, country, aliases, source, active, created_at",
        )
        .bind(name)
        .bind(external_id)
        .bind(country)
        .bind(source)
        .fetch_one(&self.pool)
        .await?;
        Ok(actor)
    }
}
