//! Common error types for Capsule Vision tooling

use thiserror::Error;

/// Common result type for Capsule Vision operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Capsule Vision tools
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure to materialize a table from raw bytes.
///
/// Every reader returns this instead of panicking or guessing, so callers can
/// tell a malformed upload apart from a successfully loaded table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed spreadsheet: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook contains no worksheets")]
    EmptyWorkbook,

    #[error("file has no header row")]
    MissingHeader,
}
