use chrono::{DateTime, Utc};

use crate::errors::VigiloError;
use crate::models::{truncate_error, JobRun};

use super::Database;

impl Database {
    pub async fn start_job(
        &self,
        job_type: &str,
        trigger: &str,
        actor_id: Option<i64>,
        actor_name: Option<&str>,
        total_items: i32,
    ) -> Result<JobRun, VigiloError> {
        let job = sqlx::query_as::<_, JobRun>(
            "INSERT INTO job_runs (job_type, trigger, status, actor_id, actor_name, total_items)
             VALUES ($1, $2, 'RUNNING', $3, $4, $5)
             RETURNING id, job_type, trigger, status, actor_id, actor_name, total_items,
                       processed_items, details, error, started_at, finished_at, updated_at",
        )
        .bind(job_type)
        .bind(trigger)
        .bind(actor_id)
        .bind(actor_name)
        .bind(total_items)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn update_job_progress(&self, id: i64, processed_items: i32) -> Result<(), VigiloError> {
        sqlx::query("UPDATE job_runs SET processed_items = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(processed_items)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn finish_job_success(&self, id: i64, details: &str, finished_at: DateTime<Utc>) -> Result<(), VigiloError> {
        sqlx::query(
            "UPDATE job_runs SET status = 'SUCCESS', details = $2, finished_at = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(details)
        .bind(finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Error text is truncated to 1000 characters before being persisted
    /// (spec §7).
    pub async fn finish_job_error(&self, id: i64, error: &str, finished_at: DateTime<Utc>) -> Result<(), VigiloError> {
        let truncated = truncate_error(error);
        sqlx::query(
            "UPDATE job_runs SET status = 'ERROR', error = $2, finished_at = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(truncated)
        .bind(finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_job(&self, id: i64) -> Result<Option<JobRun>, VigiloError> {
        let job = sqlx::query_as::<_, JobRun>(
            "SELECT id, job_type, trigger, status, actor_id, actor_name, total_items,
                    processed_items, details, error, started_at, finished_at, updated_at
             FROM job_runs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn list_recent_jobs(&self, job_type: Option<&str>, limit: i64) -> Result<Vec<JobRun>, VigiloError> {
        let jobs = match job_type {
            Some(jt) => {
                sqlx::query_as::<_, JobRun>(
                    "SELECT id, job_type, trigger, status, actor_id, actor_name, total_items,
                            processed_items, details, error, started_at, finished_at, updated_at
                     FROM job_runs WHERE job_type = $1 ORDER BY started_at DESC LIMIT $2",
                )
                .bind(jt)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, JobRun>(
                    "SELECT id, job_type, trigger, status, actor_id, actor_name, total_items,
                            processed_items, details, error, started_at, finished_at, updated_at
                     FROM job_runs ORDER BY started_at DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(jobs)
    }
}
