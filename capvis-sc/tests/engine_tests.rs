//! End-to-end engine tests
//!
//! Reference files are written into a temp data folder and submissions are
//! generated as real `.xlsx` workbooks, so every test goes through the same
//! readers the CLI and HTTP surfaces use.

use std::path::Path;

use capvis_common::{CheckerConfig, Table, TableFormat};
use capvis_sc::catalog::{sample_submission, ReferenceCatalog, CLASS_LABELS};
use capvis_sc::{Category, EngineState, Severity, ValidationEngine, ValidationMode};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn xlsx_bytes(table: &Table) -> Vec<u8> {
    xlsx_bytes_from_column(table, 0)
}

/// Workbook whose table starts at `first_col`, leaving earlier columns empty
fn xlsx_bytes_from_column(table: &Table, first_col: u16) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, first_col + col as u16, header).unwrap();
    }
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                sheet
                    .write_string(r as u32 + 1, first_col + c as u16, value)
                    .unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn submission(ids: &[&str]) -> Table {
    let mut headers = vec!["image_path".to_string()];
    headers.extend(CLASS_LABELS.iter().map(|c| c.to_string()));
    headers.push("predicted_class".to_string());

    let rows = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut row = vec![Some(id.to_string())];
            row.extend((0..CLASS_LABELS.len()).map(|_| Some("0.1".to_string())));
            row.push(Some(CLASS_LABELS[i % CLASS_LABELS.len()].to_string()));
            row
        })
        .collect();
    Table::new(headers, rows)
}

fn numbered(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{:03}.jpg", prefix, i)).collect()
}

/// Data folder holding a test identifier list and training/validation tables
fn data_folder(test_ids: &[&str], ground_truth: &Table) -> (TempDir, CheckerConfig) {
    let dir = TempDir::new().unwrap();

    let mut csv = String::from("file_name\n");
    for id in test_ids {
        csv.push_str(id);
        csv.push('\n');
    }
    std::fs::write(dir.path().join("file_names_list.csv"), csv).unwrap();

    let gt = xlsx_bytes(ground_truth);
    std::fs::write(dir.path().join("training_ground_truth.xlsx"), &gt).unwrap();
    std::fs::write(dir.path().join("validation_ground_truth.xlsx"), &gt).unwrap();

    let config = CheckerConfig {
        data_folder: dir.path().to_path_buf(),
        ..CheckerConfig::default()
    };
    (dir, config)
}

fn sample_ids() -> Vec<&'static str> {
    vec!["00Z0Xo99wp.jpg", "02hvtCoV9C.jpg", "03pjR51twC.jpg", "03UqLvuk8v.jpg"]
}

// =============================================================================
// Test mode
// =============================================================================

#[test]
fn test_sample_submission_passes() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&sample_submission()), None);
    assert!(report.passed(), "unexpected findings: {:?}", report.messages());
    assert!(report.findings.is_empty());
}

#[test]
fn test_missing_identifier_column_single_fatal() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.headers[0] = "image".to_string();
    table.rows[0][11] = Some("Tumor".to_string());

    let run = engine.run(ValidationMode::Test, Ok(table));
    assert_eq!(run.state(), EngineState::Failed);
    let report = run.into_report();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, Severity::Fatal);
    assert_eq!(report.findings[0].category, Category::MissingIdentifierColumn);
}

#[test]
fn test_twelve_missing_identifiers_truncated() {
    let present = numbered("img", 5);
    let absent = numbered("gone", 12);
    let reference: Vec<&str> = present.iter().chain(&absent).map(String::as_str).collect();
    let uploaded: Vec<&str> = present.iter().map(String::as_str).collect();

    let (_dir, config) = data_folder(&reference, &sample_submission());
    let engine = ValidationEngine::new(config);

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&submission(&uploaded)), None);
    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.category, Category::MissingIdentifiers);
    assert_eq!(finding.severity, Severity::Error);
    assert!(finding.truncated);
    assert!(finding.affected_identifiers.is_empty());
    assert_eq!(finding.affected_count, 12);
}

#[test]
fn test_ten_missing_identifiers_listed() {
    let present = numbered("img", 5);
    let absent = numbered("gone", 10);
    let reference: Vec<&str> = present.iter().chain(&absent).map(String::as_str).collect();
    let uploaded: Vec<&str> = present.iter().map(String::as_str).collect();

    let (_dir, config) = data_folder(&reference, &sample_submission());
    let engine = ValidationEngine::new(config);

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&submission(&uploaded)), None);
    assert_eq!(report.findings.len(), 1);
    assert!(!report.findings[0].truncated);
    assert_eq!(report.findings[0].affected_identifiers, absent);
}

#[test]
fn test_invalid_class_on_row_three() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.rows[2][11] = Some("Tumor".to_string());

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&table), None);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category, Category::InvalidClassLabels);
    assert_eq!(report.findings[0].affected_identifiers, vec!["03pjR51twC.jpg"]);
}

#[test]
fn test_blank_probability_reported_as_missing_value() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.rows[1][4] = None;

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&table), None);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category, Category::MissingValues);
    assert_eq!(report.findings[0].affected_identifiers, vec!["02hvtCoV9C.jpg"]);
}

#[test]
fn test_extra_column_and_duplicates_reported_together() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.headers.push("confidence".to_string());
    for row in &mut table.rows {
        row.push(Some("1".to_string()));
    }
    let repeat = table.rows[0].clone();
    table.rows.push(repeat);

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&table), None);
    let categories: Vec<Category> = report.findings.iter().map(|f| f.category).collect();
    assert_eq!(
        categories,
        vec![Category::UnexpectedColumns, Category::DuplicateIdentifiers]
    );
}

#[test]
fn test_validation_is_idempotent() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.rows[0][11] = Some("Tumor".to_string());
    table.rows[3][0] = Some("elsewhere.jpg".to_string());
    let bytes = xlsx_bytes(&table);

    let first = engine.validate_bytes(ValidationMode::Test, &bytes, None);
    let second = engine.validate_bytes(ValidationMode::Test, &bytes, None);
    assert_eq!(first, second);
    assert!(!first.passed());
}

#[test]
fn test_malformed_upload_is_fatal() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let report = engine.validate_bytes(ValidationMode::Test, b"PK\x03\x04garbage", None);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category, Category::UnreadableSubmission);
    assert!(report.findings[0].message.starts_with("Error reading the file:"));
}

#[test]
fn test_missing_reference_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let engine = ValidationEngine::new(CheckerConfig {
        data_folder: dir.path().to_path_buf(),
        ..CheckerConfig::default()
    });

    let report = engine.validate_bytes(ValidationMode::Test, &xlsx_bytes(&sample_submission()), None);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category, Category::UnreadableReference);
}

#[test]
fn test_csv_upload_with_explicit_format() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let csv = sample_submission().to_csv().unwrap();
    let report = engine.validate_bytes(ValidationMode::Test, csv.as_bytes(), Some(TableFormat::Csv));
    assert!(report.passed(), "unexpected findings: {:?}", report.messages());
}

// =============================================================================
// Training / validation modes
// =============================================================================

#[test]
fn test_training_exact_match_passes() {
    let (_dir, config) = data_folder(&[], &sample_submission());
    let engine = ValidationEngine::new(config);

    let report = engine.validate_bytes(ValidationMode::Training, &xlsx_bytes(&sample_submission()), None);
    assert!(report.passed(), "unexpected findings: {:?}", report.messages());
}

#[test]
fn test_training_renamed_column_is_order_mismatch_not_shape() {
    let (_dir, config) = data_folder(&[], &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.headers[7] = "Normal class".to_string();

    let report = engine.validate_bytes(ValidationMode::Training, &xlsx_bytes(&table), None);
    assert!(report.of_category(Category::ColumnOrderMismatch).count() == 1);
    assert_eq!(report.of_category(Category::ShapeMismatch).count(), 0);
    assert_eq!(report.findings.len(), 1);
}

#[test]
fn test_validation_reordered_columns_rejected() {
    let (_dir, config) = data_folder(&[], &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.headers.swap(1, 2);
    for row in &mut table.rows {
        row.swap(1, 2);
    }

    let report = engine.validate_bytes(ValidationMode::Validation, &xlsx_bytes(&table), None);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category, Category::ColumnOrderMismatch);
}

#[test]
fn test_training_shape_and_identifiers_reported_together() {
    let (_dir, config) = data_folder(&[], &sample_submission());
    let engine = ValidationEngine::new(config);

    let mut table = sample_submission();
    table.rows.pop();

    let report = engine.validate_bytes(ValidationMode::Training, &xlsx_bytes(&table), None);
    let categories: Vec<Category> = report.findings.iter().map(|f| f.category).collect();
    assert_eq!(categories, vec![Category::ShapeMismatch, Category::MissingIdentifiers]);
    assert_eq!(report.findings[1].affected_identifiers, vec!["03UqLvuk8v.jpg"]);
}

#[test]
fn test_upload_shifted_right_is_not_repaired() {
    let (_dir, config) = data_folder(&[], &sample_submission());
    let engine = ValidationEngine::new(config);

    let bytes = xlsx_bytes_from_column(&sample_submission(), 1);
    let report = engine.validate_bytes(ValidationMode::Training, &bytes, None);

    assert!(!report.passed());
    let categories: Vec<Category> = report.findings.iter().map(|f| f.category).collect();
    assert!(categories.contains(&Category::ShapeMismatch));
    assert!(categories.contains(&Category::ColumnOrderMismatch));
    assert!(categories.contains(&Category::MissingValues));
}

#[test]
fn test_ground_truth_payload_is_byte_identical() {
    let (dir, config) = data_folder(&[], &sample_submission());

    let payload = ReferenceCatalog::ground_truth_payload(&config, ValidationMode::Training)
        .unwrap()
        .unwrap();
    let on_disk = std::fs::read(dir.path().join("training_ground_truth.xlsx")).unwrap();
    assert_eq!(payload.bytes, on_disk);
    assert_eq!(payload.file_name, "training_ground_truth.xlsx");
    assert_eq!(payload.format, TableFormat::Xlsx);

    // Same bytes whether taken straight from a freshly loaded catalog
    let from_catalog = ReferenceCatalog::load(&config, ValidationMode::Training)
        .unwrap()
        .into_ground_truth_payload()
        .unwrap();
    assert_eq!(from_catalog, payload);
}

#[test]
fn test_catalog_load_is_repeatable() {
    let (_dir, config) = data_folder(&sample_ids(), &sample_submission());
    for mode in ValidationMode::ALL {
        let first = ReferenceCatalog::load(&config, mode).unwrap();
        let second = ReferenceCatalog::load(&config, mode).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_validate_path_reads_by_extension() {
    let (dir, config) = data_folder(&sample_ids(), &sample_submission());
    let engine = ValidationEngine::new(config);

    let upload = dir.path().join("team.xlsx");
    std::fs::write(&upload, xlsx_bytes(&sample_submission())).unwrap();

    let report = engine.validate_path(ValidationMode::Test, Path::new(&upload));
    assert!(report.passed(), "unexpected findings: {:?}", report.messages());
}
