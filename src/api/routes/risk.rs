use axum::extract::{Path, State};
use axum::Json;

use crate::api::AppState;
use crate::errors::VigiloError;
use crate::models::CountryRiskSnapshot;

pub async fn latest_risk(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<CountryRiskSnapshot>, VigiloError> {
    let snapshot = state
        .db
        .latest_risk_snapshot(&country)
        .await?
        .ok_or_else(|| VigiloError::NotFound(format!("no risk snapshot for {country}")))?;
    Ok(Json(snapshot))
}
