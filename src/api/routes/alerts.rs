use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::errors::VigiloError;
use crate::models::Alert;

#[derive(Deserialize)]
pub struct ListAlertsQuery {
    pub limit: Option<i64>,
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<Vec<Alert>>, VigiloError> {
    let alerts = state.db.list_recent_alerts(query.limit.unwrap_or(50)).await?;
    Ok(Json(alerts))
}
