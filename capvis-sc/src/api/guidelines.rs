//! Participant guidelines and expected-format example

use axum::Json;
use capvis_common::Table;
use serde::Serialize;

use crate::catalog::{sample_submission, GUIDELINES};
use crate::ClassVocabulary;

/// Guidelines response
#[derive(Debug, Serialize)]
pub struct GuidelinesResponse {
    pub guidelines: Vec<&'static str>,
    pub classes: Vec<&'static str>,
    pub sample: Table,
}

/// GET /api/guidelines
pub async fn get_guidelines() -> Json<GuidelinesResponse> {
    Json(GuidelinesResponse {
        guidelines: GUIDELINES.to_vec(),
        classes: ClassVocabulary.labels().to_vec(),
        sample: sample_submission(),
    })
}
