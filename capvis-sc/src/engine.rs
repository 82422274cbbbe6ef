//! Validation engine
//!
//! Runs one upload through every check and assembles a [`ValidationReport`].
//!
//! # Pipeline
//! ```text
//! NotStarted → Loading → Checking → Done
//!                 │          │
//!                 └──────────┴──→ Failed (fatal)
//! ```
//! - **Loading**: upload and reference artifact must both be readable
//! - **Precondition**: the identifier column must exist in the upload
//! - **Checking**: identifier set, structure and content checks all run;
//!   none is skipped because another failed
//!
//! A fatal outcome produces a report holding exactly one fatal finding.
//! The engine keeps no state between calls.

use std::path::Path;

use capvis_common::{read_table, read_table_file, CheckerConfig, Table, TableError, TableFormat};
use tracing::{debug, info, warn};

use crate::catalog::{ReferenceArtifact, ReferenceCatalog};
use crate::mode::ValidationMode;
use crate::report::{Category, Finding, ValidationReport};
use crate::validators::set_comparator::{identifier_findings, uploaded_identifiers};
use crate::validators::{ContentValidator, StructuralValidator};

/// Where a validation run is, or where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    NotStarted,
    Loading,
    Checking,
    Done,
    Failed,
}

/// One validation pass: its terminal state and its report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRun {
    mode: ValidationMode,
    state: EngineState,
    findings: Vec<Finding>,
}

impl ValidationRun {
    fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            state: EngineState::NotStarted,
            findings: Vec::new(),
        }
    }

    fn transition(&mut self, next: EngineState) {
        debug!(mode = %self.mode, from = ?self.state, to = ?next, "Validation state change");
        self.state = next;
    }

    fn fail(mut self, finding: Finding) -> Self {
        warn!(mode = %self.mode, category = ?finding.category, "{}", finding.message);
        self.transition(EngineState::Failed);
        self.findings = vec![finding];
        self
    }

    /// Loading: accept the upload or fail with a fatal finding
    fn load_upload(mut self, upload: Result<Table, TableError>) -> Result<(Self, Table), Self> {
        self.transition(EngineState::Loading);
        match upload {
            Ok(table) => Ok((self, table)),
            Err(e) => Err(self.fail(Finding::fatal(
                Category::UnreadableSubmission,
                format!("Error reading the file: {}", e),
            ))),
        }
    }

    /// Precondition, then Checking
    fn check(mut self, catalog: &ReferenceCatalog, table: &Table) -> Self {
        let Some(id_column) = table.column_index(&catalog.identifier_column) else {
            return self.fail(Finding::fatal(
                Category::MissingIdentifierColumn,
                format!(
                    "The '{}' column is missing from the uploaded file.",
                    catalog.identifier_column
                ),
            ));
        };

        self.transition(EngineState::Checking);

        if let ReferenceArtifact::Identifiers(ids) = &catalog.artifact {
            let uploaded = uploaded_identifiers(table, id_column);
            self.findings.extend(identifier_findings(ids.as_set(), &uploaded));
        }
        self.findings.extend(StructuralValidator::new(catalog).validate(table));
        self.findings.extend(
            ContentValidator::new(table, id_column, &catalog.identifier_column).validate(catalog),
        );

        self.transition(EngineState::Done);
        info!(
            mode = %self.mode,
            rows = table.rows.len(),
            findings = self.findings.len(),
            passed = self.findings.is_empty(),
            "Validation complete"
        );
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Terminal state: `Done` or `Failed`
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn into_report(self) -> ValidationReport {
        ValidationReport::new(self.mode, self.findings)
    }
}

/// Validates uploads against reference data located through the config
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    config: CheckerConfig,
}

impl ValidationEngine {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Full pass, loading the reference artifact for `mode` from disk
    pub fn run(&self, mode: ValidationMode, upload: Result<Table, TableError>) -> ValidationRun {
        let (run, table) = match ValidationRun::new(mode).load_upload(upload) {
            Ok(loaded) => loaded,
            Err(failed) => return failed,
        };

        let catalog = match ReferenceCatalog::load(&self.config, mode) {
            Ok(catalog) => catalog,
            Err(e) => {
                return run.fail(Finding::fatal(
                    Category::UnreadableReference,
                    format!("Error reading the reference file: {}", e),
                ))
            }
        };

        run.check(&catalog, &table)
    }

    /// Full pass against an already-loaded catalog
    pub fn run_with_catalog(
        catalog: &ReferenceCatalog,
        upload: Result<Table, TableError>,
    ) -> ValidationRun {
        match ValidationRun::new(catalog.mode).load_upload(upload) {
            Ok((run, table)) => run.check(catalog, &table),
            Err(failed) => failed,
        }
    }

    pub fn validate_table(
        &self,
        mode: ValidationMode,
        upload: Result<Table, TableError>,
    ) -> ValidationReport {
        self.run(mode, upload).into_report()
    }

    /// Validate raw upload bytes; the format is sniffed when not given
    pub fn validate_bytes(
        &self,
        mode: ValidationMode,
        bytes: &[u8],
        format: Option<TableFormat>,
    ) -> ValidationReport {
        let format = format.unwrap_or_else(|| TableFormat::sniff(bytes));
        self.validate_table(mode, read_table(bytes, format))
    }

    /// Validate a file on disk, choosing the reader by extension
    pub fn validate_path(&self, mode: ValidationMode, path: &Path) -> ValidationReport {
        self.validate_table(mode, read_table_file(path))
    }
}
