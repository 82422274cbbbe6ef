//! # Capsule Vision Common Library
//!
//! Shared code for the Capsule Vision challenge tooling including:
//! - Error taxonomy (`Error`, `TableError`)
//! - Configuration loading (`CheckerConfig`)
//! - In-memory table model and spreadsheet/CSV readers

pub mod config;
pub mod error;
pub mod table;

pub use config::{CheckerConfig, ConfigSource};
pub use error::{Error, Result, TableError};
pub use table::{read_table, read_table_file, Table, TableFormat};
