use chrono::{DateTime, Utc};

use crate::errors::VigiloError;
use crate::models::{MitreSyncConfig, ScheduleConfig};

use super::Database;

impl Database {
    /// Lazily creates the singleton row with defaults on first read
    /// (spec §6: `06:00` / `mon,tue,wed,thu,fri` / enabled).
    pub async fn load_schedule_config(&self) -> Result<ScheduleConfig, VigiloError> {
        if let Some(row) = sqlx::query_as::<_, ScheduleConfig>(
            "SELECT id, time_hhmm, days, enabled, last_run_at, running, lock_until, updated_at
             FROM schedule_config ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(row);
        }

        let row = sqlx::query_as::<_, ScheduleConfig>(
            "INSERT INTO schedule_config DEFAULT VALUES
             RETURNING id, time_hhmm, days, enabled, last_run_at, running, lock_until, updated_at",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lazily creates the singleton row with defaults on first read
    /// (spec §6: `sun` / `03:00` / enabled).
    pub async fn load_mitre_sync_config(&self) -> Result<MitreSyncConfig, VigiloError> {
        if let Some(row) = sqlx::query_as::<_, MitreSyncConfig>(
            "SELECT id, day_of_week, time_hhmm, enabled, last_run_at, running, lock_until, updated_at
             FROM mitre_sync_config ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(row);
        }

        let row = sqlx::query_as::<_, MitreSyncConfig>(
            "INSERT INTO mitre_sync_config DEFAULT VALUES
             RETURNING id, day_of_week, time_hhmm, enabled, last_run_at, running, lock_until, updated_at",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Conditional UPDATE lease acquisition (spec §4.7 step 4). Returns
    /// `true` iff this call acquired the lease (exactly one row affected).
    pub async fn acquire_schedule_lease(&self, id: i64, lock_until: DateTime<Utc>) -> Result<bool, VigiloError> {
        let result = sqlx::query(
            "UPDATE schedule_config SET running = TRUE, lock_until = $2, updated_at = now()
             WHERE id = $1 AND (running = FALSE OR lock_until IS NULL OR lock_until < now())",
        )
        .bind(id)
        .bind(lock_until)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn release_schedule_lease(&self, id: i64, last_run_at: DateTime<Utc>) -> Result<(), VigiloError> {
        sqlx::query(
            "UPDATE schedule_config SET running = FALSE, lock_until = NULL, last_run_at = $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(last_run_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn acquire_mitre_lease(&self, id: i64, lock_until: DateTime<Utc>) -> Result<bool, VigiloError> {
        let result = sqlx::query(
            "UPDATE mitre_sync_config SET running = TRUE, lock_until = $2, updated_at = now()
             WHERE id = $1 AND (running = FALSE OR lock_until IS NULL OR lock_until < now())",
        )
        .bind(id)
        .bind(lock_until)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn release_mitre_lease(&self, id: i64, last_run_at: DateTime<Utc>) -> Result<(), VigiloError> {
        sqlx::query(
            "UPDATE mitre_sync_config SET running = FALSE, lock_until = NULL, last_run_at = $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(last_run_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
