//! Content Validator
//!
//! Row-level checks on an uploaded table:
//! 1. **Completeness**: no null cell anywhere
//! 2. **Categorical validity**: every predicted class is in the vocabulary
//! 3. **Uniqueness**: no identifier appears twice
//!
//! The checks are independent and always all run. Each reports the affected
//! rows by identifier under the truncation policy.

use std::collections::HashSet;

use capvis_common::Table;
use tracing::debug;

use crate::catalog::{ClassVocabulary, ReferenceCatalog};
use crate::report::{Category, Finding};

/// Row-level checks bound to one upload
pub struct ContentValidator<'a> {
    table: &'a Table,
    id_column: usize,
    identifier_name: &'a str,
}

impl<'a> ContentValidator<'a> {
    /// `id_column` is the index of the identifier column in `table`
    pub fn new(table: &'a Table, id_column: usize, identifier_name: &'a str) -> Self {
        Self {
            table,
            id_column,
            identifier_name,
        }
    }

    /// Run all three checks
    pub fn validate(&self, catalog: &ReferenceCatalog) -> Vec<Finding> {
        let findings: Vec<Finding> = [
            self.check_completeness(),
            self.check_class_labels(&catalog.predicted_class_column, &catalog.vocabulary),
            self.check_uniqueness(),
        ]
        .into_iter()
        .flatten()
        .collect();

        debug!(findings = findings.len(), "Content validation complete");
        findings
    }

    /// Rows holding at least one null cell
    pub fn check_completeness(&self) -> Option<Finding> {
        let rows: Vec<String> = self
            .table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(Option::is_none))
            .map(|(i, _)| self.table.row_label(i, self.id_column))
            .collect();

        if rows.is_empty() {
            return None;
        }

        let id = self.identifier_name;
        Some(Finding::listing(
            Category::MissingValues,
            rows,
            |list| {
                format!(
                    "The file contains missing values. Missing values found in rows with {}: {}",
                    id, list
                )
            },
            "The file contains missing values. Too many rows with missing predictions.",
        ))
    }

    /// Rows whose predicted class is null or outside the vocabulary
    ///
    /// Skipped when the predicted-class column is absent; structural checks
    /// already report that.
    pub fn check_class_labels(
        &self,
        predicted_class_column: &str,
        vocabulary: &ClassVocabulary,
    ) -> Option<Finding> {
        let class_idx = self.table.column_index(predicted_class_column)?;

        let rows: Vec<String> = self
            .table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row[class_idx].as_deref().is_some_and(|l| vocabulary.contains(l)))
            .map(|(i, _)| self.table.row_label(i, self.id_column))
            .collect();

        if rows.is_empty() {
            return None;
        }

        let id = self.identifier_name;
        Some(Finding::listing(
            Category::InvalidClassLabels,
            rows,
            |list| {
                format!(
                    "Some `{}` values are invalid. Invalid `{}` entries found for {}: {}",
                    predicted_class_column, predicted_class_column, id, list
                )
            },
            format!(
                "Some `{}` values are invalid. Too many invalid predicted class values.",
                predicted_class_column
            ),
        ))
    }

    /// Repeated identifiers; the first occurrence of each is not reported
    ///
    /// Null identifiers are left to the completeness check.
    pub fn check_uniqueness(&self) -> Option<Finding> {
        let mut seen: HashSet<&str> = HashSet::new();
        let repeats: Vec<String> = self
            .table
            .rows
            .iter()
            .filter_map(|row| row[self.id_column].as_deref())
            .filter(|id| !seen.insert(*id))
            .map(str::to_string)
            .collect();

        if repeats.is_empty() {
            return None;
        }

        let id = self.identifier_name;
        Some(Finding::listing(
            Category::DuplicateIdentifiers,
            repeats,
            |list| format!("Duplicate image paths found. Duplicate entries found for {}: {}", id, list),
            "Duplicate image paths found. Too many duplicate image paths found.",
        ))
    }
}
