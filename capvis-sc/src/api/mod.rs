//! HTTP API handlers for capvis-sc

pub mod buildinfo;
pub mod error;
pub mod guidelines;
pub mod health;
pub mod reference;
pub mod validate;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use guidelines::get_guidelines;
pub use health::health_routes;
pub use reference::download_reference;
pub use validate::validate_upload;
