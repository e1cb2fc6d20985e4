//! Master dataset loading.
//!
//! Column names are only known once a sheet is opened, so loading is split
//! in two phases: [`DatasetReader::read_columns`] reads the header row, and
//! [`DatasetReader::read_table`] reads the data restricted to the caller's
//! final [`ColumnSelection`].

mod reader;

pub use reader::DatasetReader;

use std::path::Path;

use crate::error::DatasetError;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Supported dataset file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Spreadsheet workbook (xlsx, xlsm, xls, xlsb, ods).
    Workbook,
    /// Comma-separated values, exposed as a single sheet.
    Csv,
}

impl DatasetFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(DatasetFormat::Workbook),
            "csv" => Ok(DatasetFormat::Csv),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Which columns the full read keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    /// Every column of the sheet.
    #[default]
    All,
    /// Only the named columns (the key column is always kept).
    Columns(Vec<String>),
}

impl ColumnSelection {
    pub fn keeps(&self, name: &str) -> bool {
        match self {
            ColumnSelection::All => true,
            ColumnSelection::Columns(columns) => columns.iter().any(|c| c == name),
        }
    }
}

/// Turn raw header labels into unique column names.
///
/// Blank labels become `Unnamed: <index>`; repeats get a `.1`, `.2`, ...
/// suffix.
pub fn column_names(labels: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(labels.len());

    for (index, label) in labels.iter().enumerate() {
        let base = if label.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            label.clone()
        };

        let mut name = base.clone();
        let mut counter = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, counter);
            counter += 1;
        }
        names.push(name);
    }

    names
}
