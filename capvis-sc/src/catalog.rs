//! Reference catalog: schema, class vocabulary and reference identifiers
//!
//! A catalog is loaded fresh for every validation call. Loading only reads
//! files; it never writes or caches, so loading twice yields equal catalogs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use capvis_common::config::{CheckerConfig, ReferenceKind};
use capvis_common::table::{read_table, Table, TableFormat};
use capvis_common::TableError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::mode::ValidationMode;

/// The closed set of class labels, in schema order
pub const CLASS_LABELS: [&str; 10] = [
    "Angioectasia",
    "Bleeding",
    "Erosion",
    "Erythema",
    "Foreign Body",
    "Lymphangiectasia",
    "Normal",
    "Polyp",
    "Ulcer",
    "Worms",
];

/// Upload guidelines shown to participants next to the sample table
pub const GUIDELINES: [&str; 5] = [
    "image_path column should contain only the image name (e.g., image.jpg).",
    "Predicted probabilities for each class should be present along with the predicted_class column.",
    "Predictions for all images must be complete, with no blanks or missing values.",
    "Correct file can be generated from the evaluation code provided to participants.",
    "Excel file name should be same as team name.",
];

/// Reference catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    #[error("{} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

/// Fixed vocabulary of class labels
///
/// Membership is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassVocabulary;

impl ClassVocabulary {
    pub fn labels(&self) -> &'static [&'static str] {
        &CLASS_LABELS
    }

    pub fn contains(&self, label: &str) -> bool {
        CLASS_LABELS.contains(&label)
    }
}

/// Ordered expected column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// `identifier ∪ vocabulary ∪ predicted_class`, in that order
    pub fn for_submission(identifier_column: &str, predicted_class_column: &str) -> Self {
        let mut columns = vec![identifier_column.to_string()];
        columns.extend(CLASS_LABELS.iter().map(|c| c.to_string()));
        columns.push(predicted_class_column.to_string());
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Expected row identifiers for test mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceIdentifierSet(BTreeSet<String>);

impl ReferenceIdentifierSet {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ground-truth table for training and validation modes
///
/// Keeps the raw file bytes so the exact file used for comparison can be
/// offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    table: Table,
    raw: Vec<u8>,
    file_name: String,
}

impl ReferenceTable {
    pub fn new(table: Table, raw: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            table,
            raw,
            file_name: file_name.into(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// Mode-specific reference data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceArtifact {
    Identifiers(ReferenceIdentifierSet),
    GroundTruth(ReferenceTable),
}

/// Raw ground-truth file offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthPayload {
    pub file_name: String,
    pub format: TableFormat,
    pub bytes: Vec<u8>,
}

/// Everything a validation pass compares an upload against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCatalog {
    pub mode: ValidationMode,
    pub schema: Schema,
    pub vocabulary: ClassVocabulary,
    pub identifier_column: String,
    pub predicted_class_column: String,
    pub artifact: ReferenceArtifact,
}

impl ReferenceCatalog {
    /// Load the reference artifact for `mode` from the configured paths
    pub fn load(config: &CheckerConfig, mode: ValidationMode) -> Result<Self, CatalogError> {
        let path = config.reference_path(reference_kind(mode));
        debug!(mode = %mode, path = %path.display(), "Loading reference artifact");

        let raw = std::fs::read(&path).map_err(|e| CatalogError::Read {
            path: path.clone(),
            source: TableError::Io(e),
        })?;
        let table = read_table(&raw, TableFormat::from_path(&path)).map_err(|source| {
            CatalogError::Read {
                path: path.clone(),
                source,
            }
        })?;

        let artifact = if mode.uses_ground_truth() {
            require_column(&table, &config.identifier_column, &path)?;
            ReferenceArtifact::GroundTruth(ReferenceTable::new(table, raw, download_name(&path)))
        } else {
            let column = &config.reference.test_identifier_column;
            require_column(&table, column, &path)?;
            let ids = table
                .column(column)
                .into_iter()
                .flatten()
                .flatten()
                .map(str::to_string);
            let ids = ReferenceIdentifierSet::new(ids);
            if ids.is_empty() {
                warn!(path = %path.display(), "Reference identifier list is empty");
            }
            debug!(identifiers = ids.len(), "Loaded reference identifiers");
            ReferenceArtifact::Identifiers(ids)
        };

        Ok(Self::with_artifact(config, mode, artifact))
    }

    /// Build a catalog around an already-loaded artifact
    pub fn with_artifact(
        config: &CheckerConfig,
        mode: ValidationMode,
        artifact: ReferenceArtifact,
    ) -> Self {
        Self {
            mode,
            schema: Schema::for_submission(&config.identifier_column, &config.predicted_class_column),
            vocabulary: ClassVocabulary,
            identifier_column: config.identifier_column.clone(),
            predicted_class_column: config.predicted_class_column.clone(),
            artifact,
        }
    }

    /// Ground-truth file for `mode`, as loaded for comparison
    ///
    /// Returns `None` for test mode, which has no downloadable ground truth.
    /// The bytes are the ones [`ReferenceCatalog::load`] parsed, so a file
    /// that cannot be compared against cannot be downloaded either.
    pub fn ground_truth_payload(
        config: &CheckerConfig,
        mode: ValidationMode,
    ) -> Result<Option<GroundTruthPayload>, CatalogError> {
        if !mode.uses_ground_truth() {
            return Ok(None);
        }
        Ok(Self::load(config, mode)?.into_ground_truth_payload())
    }

    /// Hand over the raw ground-truth file; `None` for an identifier list
    pub fn into_ground_truth_payload(self) -> Option<GroundTruthPayload> {
        match self.artifact {
            ReferenceArtifact::GroundTruth(gt) => Some(GroundTruthPayload {
                format: TableFormat::from_path(Path::new(&gt.file_name)),
                file_name: gt.file_name,
                bytes: gt.raw,
            }),
            ReferenceArtifact::Identifiers(_) => None,
        }
    }
}

fn reference_kind(mode: ValidationMode) -> ReferenceKind {
    match mode {
        ValidationMode::Test => ReferenceKind::TestIdentifiers,
        ValidationMode::Training => ReferenceKind::TrainingGroundTruth,
        ValidationMode::Validation => ReferenceKind::ValidationGroundTruth,
    }
}

fn require_column(table: &Table, column: &str, path: &Path) -> Result<(), CatalogError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(CatalogError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
    }
}

fn download_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ground_truth".to_string())
}

/// Example of a correctly formatted submission
pub fn sample_submission() -> Table {
    const IMAGES: [&str; 4] = ["00Z0Xo99wp.jpg", "02hvtCoV9C.jpg", "03pjR51twC.jpg", "03UqLvuk8v.jpg"];
    // One row per class label, one column per image
    const PROBABILITIES: [[&str; 4]; 10] = [
        ["0.004180671", "5.31846E-06", "0.01316455", "1.81824E-06"],
        ["1.24772E-09", "2.6963E-05", "7.35843E-05", "1.31746E-06"],
        ["0.007089304", "0.000178704", "0.000328246", "0.045647398"],
        ["1.42296E-07", "0.05799336", "0.009602185", "0.001173414"],
        ["0.038560923", "1.55969E-08", "0.190064773", "0.001607239"],
        ["2.79127E-05", "0.00050396", "0.721927106", "1.16342E-05"],
        ["0.018649779", "0.941272676", "4.30372E-05", "0.204296276"],
        ["6.76447E-08", "1.89326E-05", "0.018246552", "0.747260571"],
        ["0.931491256", "6.26834E-08", "0.046549879", "3.51713E-07"],
        ["3.32206E-17", "3.29838E-10", "1.20817E-07", "3.123E-09"],
    ];
    const PREDICTED: [&str; 4] = ["Ulcer", "Normal", "Lymphangiectasia", "Polyp"];

    let defaults = CheckerConfig::default();
    let headers = Schema::for_submission(&defaults.identifier_column, &defaults.predicted_class_column)
        .columns()
        .to_vec();

    let rows = (0..IMAGES.len())
        .map(|i| {
            std::iter::once(IMAGES[i])
                .chain(PROBABILITIES.iter().map(|class| class[i]))
                .chain(std::iter::once(PREDICTED[i]))
                .map(|cell| Some(cell.to_string()))
                .collect()
        })
        .collect();

    Table::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_exact() {
        let vocab = ClassVocabulary;
        assert_eq!(vocab.labels().len(), 10);
        assert!(vocab.contains("Foreign Body"));
        assert!(!vocab.contains("foreign body"));
        assert!(!vocab.contains("Tumor"));
        assert!(!vocab.contains(" Normal"));
    }

    #[test]
    fn test_schema_order() {
        let schema = Schema::for_submission("image_path", "predicted_class");
        assert_eq!(schema.columns().len(), 12);
        assert_eq!(schema.columns()[0], "image_path");
        assert_eq!(schema.columns()[1], "Angioectasia");
        assert_eq!(schema.columns()[11], "predicted_class");
        assert!(schema.contains("Worms"));
    }

    #[test]
    fn test_sample_submission_matches_schema() {
        let sample = sample_submission();
        let schema = Schema::for_submission("image_path", "predicted_class");
        assert_eq!(sample.headers, schema.columns());
        assert_eq!(sample.shape(), (4, 12));
        assert_eq!(
            sample.column("predicted_class").unwrap(),
            vec![Some("Ulcer"), Some("Normal"), Some("Lymphangiectasia"), Some("Polyp")]
        );
    }

    #[test]
    fn test_payload_comes_from_loaded_table() {
        let config = CheckerConfig::default();
        let catalog = ReferenceCatalog::with_artifact(
            &config,
            ValidationMode::Training,
            ReferenceArtifact::GroundTruth(ReferenceTable::new(
                Table::default(),
                b"image_path\n".to_vec(),
                "training.csv",
            )),
        );
        let payload = catalog.into_ground_truth_payload().unwrap();
        assert_eq!(payload.bytes, b"image_path\n");
        assert_eq!(payload.file_name, "training.csv");
        assert_eq!(payload.format, TableFormat::Csv);
    }

    #[test]
    fn test_identifier_catalog_has_no_payload() {
        let catalog = ReferenceCatalog::with_artifact(
            &CheckerConfig::default(),
            ValidationMode::Test,
            ReferenceArtifact::Identifiers(ReferenceIdentifierSet::default()),
        );
        assert!(catalog.into_ground_truth_payload().is_none());
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let config = CheckerConfig {
            data_folder: PathBuf::from("/nonexistent/capvis"),
            ..CheckerConfig::default()
        };
        let result = ReferenceCatalog::load(&config, ValidationMode::Test);
        assert!(matches!(result, Err(CatalogError::Read { .. })));
    }

    #[test]
    fn test_no_payload_for_test_mode() {
        let config = CheckerConfig::default();
        let payload = ReferenceCatalog::ground_truth_payload(&config, ValidationMode::Test).unwrap();
        assert!(payload.is_none());
    }
}
