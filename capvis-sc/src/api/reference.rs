//! Ground-truth download endpoint
//!
//! Serves the exact file the engine compares against in training and
//! validation modes.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use capvis_common::TableFormat;

use crate::api::ApiError;
use crate::catalog::ReferenceCatalog;
use crate::{AppState, ValidationMode};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// GET /api/reference/:mode
pub async fn download_reference(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Response, ApiError> {
    let mode: ValidationMode = mode.parse().map_err(|_| ApiError::InvalidMode(mode))?;

    let engine = state.engine.clone();
    let payload =
        tokio::task::spawn_blocking(move || ReferenceCatalog::ground_truth_payload(engine.config(), mode))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .ok_or_else(|| ApiError::NotFound(format!("no ground truth for {} mode", mode)))?;

    let content_type = match payload.format {
        TableFormat::Xlsx => XLSX_CONTENT_TYPE,
        TableFormat::Csv => "text/csv",
    };
    let disposition = format!("attachment; filename=\"{}\"", payload.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.bytes,
    )
        .into_response())
}
