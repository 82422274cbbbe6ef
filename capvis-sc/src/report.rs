//! Validation findings and the report handed to presentation layers
//!
//! A report is an ordered list of [`Finding`]s. It passes only when it holds
//! no error or fatal findings.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::mode::ValidationMode;
use crate::validators::set_comparator::TRUNCATION_LIMIT;

/// How bad a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Validation aborted; this finding is the whole report
    Fatal,
    /// Collected alongside other findings
    Error,
}

/// What kind of problem a finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UnreadableSubmission,
    UnreadableReference,
    MissingIdentifierColumn,
    MissingIdentifiers,
    ExtraIdentifiers,
    MissingColumns,
    UnexpectedColumns,
    ShapeMismatch,
    ColumnOrderMismatch,
    MissingValues,
    InvalidClassLabels,
    DuplicateIdentifiers,
}

/// One reportable outcome of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: Category,
    pub severity: Severity,
    /// Human-readable description, ready for display
    pub message: String,
    /// Offending identifiers (or column names); empty when truncated
    pub affected_identifiers: Vec<String>,
    /// Number of offending items, including those not listed
    pub affected_count: usize,
    /// True when the offending items were summarized instead of listed
    pub truncated: bool,
}

impl Finding {
    /// Fatal finding; aborts validation
    pub fn fatal(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            severity: Severity::Fatal,
            message: message.into(),
            affected_identifiers: Vec::new(),
            affected_count: 0,
            truncated: false,
        }
    }

    /// Error finding that names every affected item, however many
    pub fn error(category: Category, message: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            category,
            severity: Severity::Error,
            message: message.into(),
            affected_count: items.len(),
            affected_identifiers: items,
            truncated: false,
        }
    }

    /// Error finding under the truncation policy
    ///
    /// Up to [`TRUNCATION_LIMIT`] items are listed through `listed`, which
    /// receives them comma-joined. Beyond that only `overflow` is reported
    /// and no items are kept.
    pub fn listing(
        category: Category,
        items: Vec<String>,
        listed: impl FnOnce(&str) -> String,
        overflow: impl Into<String>,
    ) -> Self {
        if items.len() > TRUNCATION_LIMIT {
            Self {
                category,
                severity: Severity::Error,
                message: overflow.into(),
                affected_identifiers: Vec::new(),
                affected_count: items.len(),
                truncated: true,
            }
        } else {
            let message = listed(&items.join(", "));
            Self::error(category, message, items)
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self.severity, Severity::Fatal | Severity::Error)
    }
}

/// Outcome of one validation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub mode: ValidationMode,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new(mode: ValidationMode, findings: Vec<Finding>) -> Self {
        Self { mode, findings }
    }

    /// Report consisting of a single fatal finding
    pub fn fatal(mode: ValidationMode, finding: Finding) -> Self {
        debug_assert_eq!(finding.severity, Severity::Fatal);
        Self::new(mode, vec![finding])
    }

    /// True iff no finding is an error or fatal
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(Finding::is_blocking)
    }

    /// True if validation was aborted
    pub fn is_fatal(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Fatal)
    }

    /// Finding messages in report order
    pub fn messages(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.message.clone()).collect()
    }

    /// Findings of one category
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.category == category)
    }

    /// Closing line shown under the findings
    pub fn summary(&self) -> &'static str {
        if self.passed() {
            "All checks passed."
        } else {
            "File did not pass all checks. Please see the errors above."
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 4)?;
        state.serialize_field("mode", &self.mode)?;
        state.serialize_field("passed", &self.passed())?;
        state.serialize_field("summary", self.summary())?;
        state.serialize_field("findings", &self.findings)?;
        state.end()
    }
}
