use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::errors::VigiloError;
use crate::models::JobRun;

#[derive(Deserialize)]
pub struct ListJobsQuery {
    pub job_type: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobRun>>, VigiloError> {
    let jobs = state
        .db
        .list_recent_jobs(query.job_type.as_deref(), query.limit.unwrap_or(50))
        .await?;
    Ok(Json(jobs))
}

pub async fn get_job(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<JobRun>, VigiloError> {
    let job = state
        .db
        .get_job(id)
        .await?
        .ok_or_else(|| VigiloError::NotFound(format!("job {id}")))?;
    Ok(Json(job))
}
