//! Symmetric set difference and identifier reporting

use std::collections::BTreeSet;

use capvis_common::Table;

use crate::report::{Category, Finding};

/// Above this many offending items a finding is summarized, not listed
pub const TRUNCATION_LIMIT: usize = 10;

/// Result of comparing an expected set against an actual one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDifference<T: Ord> {
    /// In expected, not in actual
    pub missing: BTreeSet<T>,
    /// In actual, not in expected
    pub extra: BTreeSet<T>,
}

impl<T: Ord> SetDifference<T> {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// `missing = expected − actual`, `extra = actual − expected`
pub fn compare<T: Ord + Clone>(expected: &BTreeSet<T>, actual: &BTreeSet<T>) -> SetDifference<T> {
    SetDifference {
        missing: expected.difference(actual).cloned().collect(),
        extra: actual.difference(expected).cloned().collect(),
    }
}

/// Non-null identifiers of an uploaded table
pub fn uploaded_identifiers(table: &Table, id_column: usize) -> BTreeSet<String> {
    table
        .rows
        .iter()
        .filter_map(|row| row[id_column].clone())
        .collect()
}

/// Findings for identifiers missing from or extra to the reference set
pub fn identifier_findings(expected: &BTreeSet<String>, actual: &BTreeSet<String>) -> Vec<Finding> {
    let diff = compare(expected, actual);
    let mut findings = Vec::new();

    if !diff.missing.is_empty() {
        findings.push(Finding::listing(
            Category::MissingIdentifiers,
            diff.missing.into_iter().collect(),
            |list| format!("The following images are missing from the predictions: {}", list),
            "Image names do not match; too many missing images.",
        ));
    }

    if !diff.extra.is_empty() {
        findings.push(Finding::listing(
            Category::ExtraIdentifiers,
            diff.extra.into_iter().collect(),
            |list| format!("The following images are extra and not in the reference file: {}", list),
            "There are extra images in the predictions.",
        ));
    }

    findings
}
