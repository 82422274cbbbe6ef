//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced by the HTTP layer
///
/// Validation findings are never errors here; a failing submission is a
/// successful request with `passed: false`.
#[derive(Debug)]
pub enum ApiError {
    InvalidMode(String),
    InvalidFormat(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidMode(mode) => {
                (StatusCode::BAD_REQUEST, format!("Invalid mode: {}", mode))
            }
            ApiError::InvalidFormat(format) => {
                (StatusCode::BAD_REQUEST, format!("Invalid format: {}", format))
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
