use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::errors::VigiloError;

impl IntoResponse for VigiloError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            VigiloError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            VigiloError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            VigiloError::LeaseBusy(_) => (StatusCode::CONFLICT, self.to_string()),
            VigiloError::Config(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(json!({"error": message}))).into_response()
    }
}
