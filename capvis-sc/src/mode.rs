//! Validation mode selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which reference dataset a submission is checked against
///
/// Test mode compares columns as unordered sets against the schema and
/// identifiers against a reference list. Training and validation modes compare
/// against a full ground-truth table, including column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Test,
    Training,
    Validation,
}

impl ValidationMode {
    pub const ALL: [ValidationMode; 3] = [
        ValidationMode::Test,
        ValidationMode::Training,
        ValidationMode::Validation,
    ];

    /// True when the reference artifact is a full ground-truth table
    pub fn uses_ground_truth(self) -> bool {
        !matches!(self, ValidationMode::Test)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::Test => "test",
            ValidationMode::Training => "training",
            ValidationMode::Validation => "validation",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown validation mode: {}", s))
    }
}
