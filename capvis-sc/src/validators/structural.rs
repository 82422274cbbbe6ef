//! Structural Validator
//!
//! Checks the column layout of an upload.
//!
//! # Modes
//! - **Test**: columns compared as unordered sets against the schema
//! - **Training / Validation**: shape, column sequence and identifier set
//!   compared against the ground-truth table
//!
//! In ground-truth mode the three checks are independent; every mismatch is
//! reported.

use std::collections::BTreeSet;

use capvis_common::Table;
use tracing::debug;

use crate::catalog::{ReferenceArtifact, ReferenceCatalog, Schema};
use crate::report::{Category, Finding};
use crate::validators::set_comparator::{identifier_findings, uploaded_identifiers};

/// Mode-appropriate structural checks for one catalog
pub struct StructuralValidator<'a> {
    catalog: &'a ReferenceCatalog,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(catalog: &'a ReferenceCatalog) -> Self {
        Self { catalog }
    }

    /// Run the checks for the catalog's mode
    ///
    /// The upload must already be known to contain the identifier column.
    pub fn validate(&self, table: &Table) -> Vec<Finding> {
        let findings = match &self.catalog.artifact {
            ReferenceArtifact::Identifiers(_) => check_schema_columns(&self.catalog.schema, table),
            ReferenceArtifact::GroundTruth(gt) => {
                check_ground_truth(table, gt.table(), &self.catalog.identifier_column)
            }
        };
        debug!(
            mode = %self.catalog.mode,
            findings = findings.len(),
            "Structural validation complete"
        );
        findings
    }
}

/// Unordered column comparison against the schema
///
/// Missing columns are listed in schema order, unexpected ones in upload order.
pub fn check_schema_columns(schema: &Schema, table: &Table) -> Vec<Finding> {
    let uploaded: BTreeSet<&str> = table.headers.iter().map(String::as_str).collect();

    let missing: Vec<String> = schema
        .columns()
        .iter()
        .filter(|c| !uploaded.contains(c.as_str()))
        .cloned()
        .collect();
    let extra: Vec<String> = table
        .headers
        .iter()
        .filter(|c| !schema.contains(c))
        .cloned()
        .collect();

    let mut findings = Vec::new();
    if !missing.is_empty() {
        findings.push(Finding::error(
            Category::MissingColumns,
            format!("The following columns are missing: {}", missing.join(", ")),
            missing,
        ));
    }
    if !extra.is_empty() {
        findings.push(Finding::error(
            Category::UnexpectedColumns,
            format!("The following columns are not expected: {}", extra.join(", ")),
            extra,
        ));
    }
    findings
}

/// Exact comparison against a ground-truth table
pub fn check_ground_truth(table: &Table, reference: &Table, identifier_column: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    let (rows, cols) = table.shape();
    let (ref_rows, ref_cols) = reference.shape();
    if (rows, cols) != (ref_rows, ref_cols) {
        findings.push(Finding::error(
            Category::ShapeMismatch,
            format!(
                "Shape mismatch: expected {} rows x {} columns, found {} rows x {} columns.",
                ref_rows, ref_cols, rows, cols
            ),
            Vec::new(),
        ));
    }

    if table.headers != reference.headers {
        findings.push(column_order_finding(&table.headers, &reference.headers));
    }

    let expected = reference
        .column_index(identifier_column)
        .map(|idx| uploaded_identifiers(reference, idx))
        .unwrap_or_default();
    let actual = table
        .column_index(identifier_column)
        .map(|idx| uploaded_identifiers(table, idx))
        .unwrap_or_default();
    findings.extend(identifier_findings(&expected, &actual));

    findings
}

/// Names every uploaded column that is not where the ground truth has it
fn column_order_finding(uploaded: &[String], expected: &[String]) -> Finding {
    let width = uploaded.len().max(expected.len());
    let misplaced: Vec<String> = (0..width)
        .filter_map(|i| match (uploaded.get(i), expected.get(i)) {
            (Some(u), Some(e)) if u == e => None,
            (Some(u), Some(e)) => Some(format!("{} (expected {})", u, e)),
            (Some(u), None) => Some(format!("{} (unexpected)", u)),
            (None, Some(e)) => Some(format!("<none> (expected {})", e)),
            (None, None) => None,
        })
        .collect();

    Finding::error(
        Category::ColumnOrderMismatch,
        format!(
            "Columns do not match the ground truth in name and order: {}",
            misplaced.join(", ")
        ),
        misplaced,
    )
}
