use chrono::{DateTime, Utc};

use crate::errors::VigiloError;
use crate::models::CountryRiskSnapshot;

use super::Database;

/// Adoption count and mean persistence for one technique among a country's
/// active actors (spec §4.5 step 2, `adoption`/`persistence_days`).
pub struct TechniqueAdoption {
    pub technique_id: i64,
    pub external_code: String,
    pub display_name: String,
    pub adoption: i64,
    pub persistence_days: f64,
}

impl Database {
    pub async fn country_has_active_actors(&self, country: &str) -> Result<bool, VigiloError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM threat_actors WHERE country = $1 AND active = TRUE",
        )
        .bind(country)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// One row per technique the country's active actors currently run
    /// (`adoption > 0` only — matches the Python original's `continue` on
    /// zero adoption).
    pub async fn active_actor_count(&self, country: &str) -> Result<i32, VigiloError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM threat_actors WHERE country = $1 AND active = TRUE",
        )
        .bind(country)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as i32)
    }

    pub async fn technique_adoption_for_country(
        &self,
        country: &str,
    ) -> Result<Vec<TechniqueAdoption>, VigiloError> {
        let rows: Vec<(i64, String, String, i64, Option<f64>)> = sqlx::query_as(
            "SELECT t.id, t.external_code, t.display_name,
                    COUNT(at.id) FILTER (WHERE at.active) AS adoption,
                    AVG(EXTRACT(EPOCH FROM (now() - at.first_seen)) / 86400.0)
                        FILTER (WHERE at.active) AS persistence_days
             FROM techniques t
             JOIN actor_techniques at ON at.technique_id = t.id
             JOIN threat_actors a ON a.id = at.actor_id AND a.country = $1 AND a.active = TRUE
             GROUP BY t.id, t.external_code, t.display_name
             HAVING COUNT(at.id) FILTER (WHERE at.active) > 0",
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(technique_id, external_code, display_name, adoption, persistence_days)| {
                TechniqueAdoption {
                    technique_id,
                    external_code,
                    display_name,
                    adoption,
                    persistence_days: persistence_days.unwrap_or(0.0),
                }
            })
            .collect())
    }

    pub async fn insert_risk_snapshot(
        &self,
        country: &str,
        risk_score: f64,
        technique_count: i32,
        actor_count: i32,
        created_at: DateTime<Utc>,
    ) -> Result<CountryRiskSnapshot, VigiloError> {
        let snapshot = sqlx::query_as::<_, CountryRiskSnapshot>(
            "INSERT INTO country_risk_snapshots (country, risk_score, technique_count, actor_count, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, country, risk_score, technique_count, actor_count, created_at",
        )
        .bind(country)
        .bind(risk_score)
        .bind(technique_count)
        .bind(actor_count)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(snapshot)
    }

    /// Most recent two snapshots for a country, newest first (spec §4.5
    /// step 4 change detection).
    pub async fn recent_risk_snapshots(
        &self,
        country: &str,
    ) -> Result<Vec<CountryRiskSnapshot>, VigiloError> {
        let snapshots = sqlx::query_as::<_, CountryRiskSnapshot>(
            "SELECT id, country, risk_score, technique_count, actor_count, created_at
             FROM country_risk_snapshots WHERE country = $1 ORDER BY created_at DESC LIMIT 2",
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await?;
        Ok(snapshots)
    }

    pub async fn latest_risk_snapshot(&self, country: &str) -> Result<Option<CountryRiskSnapshot>, VigiloError> {
        let snapshot = sqlx::query_as::<_, CountryRiskSnapshot>(
            "SELECT id, country, risk_score, technique_count, actor_count, created_at
             FROM country_risk_snapshots WHERE country = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(country)
        .fetch_optional(&self.pool)
        .await?;
        Ok(snapshot)
    }

    pub async fn active_countries(&self) -> Result<Vec<String>, VigiloError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT country FROM threat_actors WHERE active = TRUE AND country IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(c,)| c).collect())
    }
}
