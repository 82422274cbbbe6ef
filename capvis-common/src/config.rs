//! Configuration loading and resolution
//!
//! The checker runs from a single immutable [`CheckerConfig`] that is built
//! once at startup and handed to the engine. Everything is optional in TOML;
//! compiled defaults match the Capsule Vision 2024 challenge layout.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `CAPVIS_CONFIG` environment variable
//! 3. `~/.config/capvis/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! `CAPVIS_DATA_FOLDER` overrides `data_folder` regardless of source.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CAPVIS_CONFIG";

/// Environment variable overriding the reference data folder
pub const DATA_FOLDER_ENV_VAR: &str = "CAPVIS_DATA_FOLDER";

/// Checker configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckerConfig {
    /// Column holding the unique row key (image file name)
    pub identifier_column: String,

    /// Column holding the predicted class label
    pub predicted_class_column: String,

    /// Folder that relative reference paths resolve against
    pub data_folder: PathBuf,

    pub reference: ReferenceConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Reference artifact locations
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Identifier list for test mode
    pub test_identifiers: PathBuf,

    /// Identifier column name inside `test_identifiers`
    ///
    /// Differs from the submission's identifier column.
    pub test_identifier_column: String,

    /// Ground-truth table for training mode
    pub training_ground_truth: PathBuf,

    /// Ground-truth table for validation mode
    pub validation_ground_truth: PathBuf,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upload body limit in bytes
    pub max_upload_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

/// Where [`CheckerConfig::resolve`] found its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    /// The per-user file exists but failed to load; defaults are in use
    IgnoredUserFile { path: PathBuf, reason: String },
    Defaults,
}

impl ConfigSource {
    /// Report the resolution outcome; an ignored per-user file is a warning
    pub fn log(&self) {
        match self {
            ConfigSource::CommandLine(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Environment(path) => {
                info!("Loaded config from {} ({})", path.display(), CONFIG_ENV_VAR)
            }
            ConfigSource::UserFile(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::IgnoredUserFile { path, reason } => {
                warn!("Ignoring config {}: {}; using compiled defaults", path.display(), reason)
            }
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
        }
    }
}

/// Which reference artifact to locate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    TestIdentifiers,
    TrainingGroundTruth,
    ValidationGroundTruth,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            identifier_column: "image_path".to_string(),
            predicted_class_column: "predicted_class".to_string(),
            data_folder: PathBuf::from("."),
            reference: ReferenceConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            test_identifiers: PathBuf::from("file_names_list.csv"),
            test_identifier_column: "file_name".to_string(),
            training_ground_truth: PathBuf::from("training_ground_truth.xlsx"),
            validation_ground_truth: PathBuf::from("validation_ground_truth.xlsx"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5730,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CheckerConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration following the priority order in the module docs
    ///
    /// An explicitly named file (CLI or env var) must load; the per-user file
    /// is optional and falls back to defaults if malformed. Nothing is logged
    /// here; the caller logs the returned [`ConfigSource`] once a subscriber
    /// is installed.
    pub fn resolve(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = if let Some(path) = cli_path {
            (Self::from_file(path)?, ConfigSource::CommandLine(path.to_path_buf()))
        } else if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            (Self::from_file(&path)?, ConfigSource::Environment(path))
        } else {
            match user_config_path().filter(|p| p.exists()) {
                Some(path) => match Self::from_file(&path) {
                    Ok(config) => (config, ConfigSource::UserFile(path)),
                    Err(e) => (
                        Self::default(),
                        ConfigSource::IgnoredUserFile {
                            path,
                            reason: e.to_string(),
                        },
                    ),
                },
                None => (Self::default(), ConfigSource::Defaults),
            }
        };

        if let Ok(folder) = std::env::var(DATA_FOLDER_ENV_VAR) {
            config.data_folder = PathBuf::from(folder);
        }

        config.validate()?;
        Ok((config, source))
    }

    /// Reject configurations the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.identifier_column.is_empty() {
            return Err(Error::Config("identifier_column must not be empty".to_string()));
        }
        if self.predicted_class_column.is_empty() {
            return Err(Error::Config(
                "predicted_class_column must not be empty".to_string(),
            ));
        }
        if self.identifier_column == self.predicted_class_column {
            return Err(Error::Config(
                "identifier_column and predicted_class_column must differ".to_string(),
            ));
        }
        if self.reference.test_identifier_column.is_empty() {
            return Err(Error::Config(
                "reference.test_identifier_column must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute or data-folder-relative path of a reference artifact
    pub fn reference_path(&self, kind: ReferenceKind) -> PathBuf {
        let file = match kind {
            ReferenceKind::TestIdentifiers => &self.reference.test_identifiers,
            ReferenceKind::TrainingGroundTruth => &self.reference.training_ground_truth,
            ReferenceKind::ValidationGroundTruth => &self.reference.validation_ground_truth,
        };
        if file.is_absolute() {
            file.clone()
        } else {
            self.data_folder.join(file)
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("capvis").join("config.toml"))
}
