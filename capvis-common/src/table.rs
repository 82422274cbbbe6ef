//! In-memory table model and readers
//!
//! Submissions arrive as `.xlsx` workbooks, reference identifier lists as
//! `.csv`. Both are fully materialized into a [`Table`] of optional string
//! cells before any check runs.
//!
//! # Normalization
//! - Empty cells and empty strings become `None`
//! - Integral numbers render without a trailing `.0`
//! - Empty header cells become `Unnamed: {index}`, including empty leading
//!   worksheet columns
//! - Repeated headers get `.1`, `.2`, ... suffixes
//! - Rows where every cell is null are dropped

use crate::error::TableError;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Zip local file header; every `.xlsx` starts with it
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Tabular data with a header row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    /// Column names, in file order
    pub headers: Vec<String>,
    /// Data rows; each row has exactly `headers.len()` cells
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table, padding or truncating rows to the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// (row count, column count)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    /// Index of the first column with this exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of the named column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// Human-readable key for a row: its identifier, or `row {n}` (1-based)
    /// when the identifier cell is null
    pub fn row_label(&self, row: usize, id_column: usize) -> String {
        match self.rows.get(row).and_then(|r| r[id_column].as_deref()) {
            Some(id) => id.to_string(),
            None => format!("row {}", row + 1),
        }
    }

    /// Render as CSV (header + rows, nulls as empty fields)
    pub fn to_csv(&self) -> Result<String, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| TableError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// On-disk format of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
}

impl TableFormat {
    /// Format from file extension (case-insensitive); anything that is not
    /// `.xlsx` is treated as CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => TableFormat::Xlsx,
            _ => TableFormat::Csv,
        }
    }

    /// Format from file content
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            TableFormat::Xlsx
        } else {
            TableFormat::Csv
        }
    }

    /// Parse a user-supplied format name ("xlsx" / "csv")
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "xlsx" => Some(TableFormat::Xlsx),
            "csv" => Some(TableFormat::Csv),
            _ => None,
        }
    }
}

/// Read a table from raw bytes
pub fn read_table(bytes: &[u8], format: TableFormat) -> Result<Table, TableError> {
    let (raw_headers, rows) = match format {
        TableFormat::Xlsx => read_xlsx(bytes)?,
        TableFormat::Csv => read_csv(bytes)?,
    };
    let headers = normalize_headers(raw_headers);
    let rows = rows
        .into_iter()
        .filter(|row| row.iter().any(Option::is_some))
        .collect();
    Ok(Table::new(headers, rows))
}

/// Read a table from disk, choosing the reader by file extension
pub fn read_table_file(path: &Path) -> Result<Table, TableError> {
    let bytes = std::fs::read(path)?;
    read_table(&bytes, TableFormat::from_path(path))
}

type RawRows = Vec<Vec<Option<String>>>;

fn read_xlsx(bytes: &[u8]) -> Result<(Vec<Option<String>>, RawRows), TableError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(TableError::EmptyWorkbook)??;

    // The range begins at the first used cell; empty leading columns still
    // belong to the sheet and must surface as `Unnamed: n` columns
    let leading = range.start().map_or(0, |(_, col)| col as usize);

    let mut rows = range
        .rows()
        .map(|row| {
            std::iter::repeat(None)
                .take(leading)
                .chain(row.iter().map(xlsx_cell))
                .collect::<Vec<_>>()
        })
        .skip_while(|row| row.iter().all(Option::is_none));

    let headers = rows.next().ok_or(TableError::MissingHeader)?;
    Ok((headers, rows.collect()))
}

fn xlsx_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => non_empty(s),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(render_float(*f)),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => Some(render_float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => non_empty(s),
    }
}

fn read_csv(bytes: &[u8]) -> Result<(Vec<Option<String>>, RawRows), TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<Option<String>> = reader.headers()?.iter().map(non_empty).collect();
    if headers.is_empty() {
        return Err(TableError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(non_empty).collect());
    }
    Ok((headers, rows))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn render_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Fill blank header names and disambiguate repeats
fn normalize_headers(raw: Vec<Option<String>>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.unwrap_or_else(|| format!("Unnamed: {}", idx));
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            unique
        })
        .collect()
}
