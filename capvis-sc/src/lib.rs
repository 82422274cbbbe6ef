//! capvis-sc library - Submission Sanity Checker
//!
//! Validates a participant's prediction spreadsheet against the challenge
//! schema and a reference dataset before it enters the evaluation pipeline.
//!
//! The engine ([`engine::ValidationEngine`]) is synchronous and holds no state
//! between calls. The HTTP surface in [`api`] is a thin shell around it.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod engine;
pub mod mode;
pub mod report;
pub mod validators;

pub use catalog::{ClassVocabulary, ReferenceCatalog, Schema};
pub use engine::{EngineState, ValidationEngine, ValidationRun};
pub use mode::ValidationMode;
pub use report::{Category, Finding, Severity, ValidationReport};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ValidationEngine>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: ValidationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let upload_limit = state.engine.config().server.max_upload_bytes;

    let api = Router::new()
        .route("/api/validate/:mode", post(api::validate_upload))
        .route("/api/reference/:mode", get(api::download_reference))
        .route("/api/guidelines", get(api::get_guidelines))
        .route("/api/buildinfo", get(api::get_build_info))
        .layer(DefaultBodyLimit::max(upload_limit));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
