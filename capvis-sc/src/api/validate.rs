//! Submission validation endpoint
//!
//! The upload is the raw request body. Its format comes from `?format=`
//! when given, otherwise it is sniffed from the content.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use capvis_common::TableFormat;
use serde::Deserialize;
use tracing::info;

use crate::api::ApiError;
use crate::{AppState, ValidationMode, ValidationReport};

/// Query parameters for validation
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    /// "xlsx" or "csv"
    pub format: Option<String>,
}

/// POST /api/validate/:mode
pub async fn validate_upload(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Query(query): Query<ValidateQuery>,
    body: Bytes,
) -> Result<Json<ValidationReport>, ApiError> {
    let mode: ValidationMode = mode.parse().map_err(|_| ApiError::InvalidMode(mode))?;
    let format = match query.format {
        Some(name) => Some(TableFormat::parse(&name).ok_or(ApiError::InvalidFormat(name))?),
        None => None,
    };

    info!(mode = %mode, bytes = body.len(), "Validating upload");

    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.validate_bytes(mode, &body, format))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(report))
}
