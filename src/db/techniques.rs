use crate::errors::VigiloError;
use crate::models::Technique;

use super::Database;

impl Database {
    pub async fn get_technique_by_code(&self, code: &str) -> Result<Option<Technique>, VigiloError> {
        let technique = sqlx::query_as::<_, Technique>(
            "SELECT id, external_code, display_name, tactics, description
             FROM techniques WHERE external_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(technique)
    }

    pub async fn list_techniques(&self) -> Result<Vec<Technique>, VigiloError> {
        let techniques = sqlx::query_as::<_, Technique>(
            "SELECT id, external_code, display_name, tactics, description FROM techniques ORDER BY external_code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(techniques)
    }

    /// Phase 1 of MITRE sync (legacy load): create missing rows only, never
    /// touch existing ones. Returns `true` if a new row was created.
    pub async fn create_technique_if_missing(
        &self,
        code: &str,
        display_name: &str,
        tactics: &str,
        description: Option<&str>,
    ) -> Result<bool, VigiloError> {
        let result = sqlx::query(
            "INSERT INTO techniques (external_code, display_name, tactics, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (external_code) DO NOTHING",
        )
        .bind(code)
        .bind(display_name)
        .bind(tactics)
        .bind(description)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Phase 2 of MITRE sync (STIX sync): upsert, updating display name,
    /// tactics and description on conflict. Returns `true` if an existing
    /// row's fields actually changed.
    pub async fn upsert_technique(
        &self,
        code: &str,
        display_name: &str,
        tactics: &str,
        description: Option<&str>,
    ) -> Result<(bool, bool), VigiloError> {
        let existing = self.get_technique_by_code(code).await?;
        let result = sqlx::query(
            "INSERT INTO techniques (external_code, display_name, tactics, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (external_code) DO UPDATE SET
                 display_name = EXCLUDED.display_name,
                 tactics = EXCLUDED.tactics,
                 description = EXCLUDED.description",
        )
        .bind(code)
        .bind(display_name)
        .bind(tactics)
        .bind(description)
        .execute(&self.pool)
        .await?;
        let _ = result;

        let created = existing.is_none();
        let updated = match existing {
            Some(prev) => {
                prev.display_name != display_name
                    || prev.tactics != tactics
                    || prev.description.as_deref() != description
            }
            None => false,
        };
        Ok((created, updated))
    }
}
