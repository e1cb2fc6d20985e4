//! Error types for the palletscan-core library.

use thiserror::Error;

/// Main error type for the palletscan library.
#[derive(Error, Debug)]
pub enum PalletError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Master dataset error.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Code extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Reconciliation error.
    #[error("reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Report generation error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// A required input was not supplied.
    #[error("missing required input: {0}")]
    MissingInput(String),

    /// The caller did not choose any output column.
    #[error("no output columns selected")]
    NoColumnsSelected,
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to reading the master dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The workbook or CSV file could not be opened.
    #[error("failed to open dataset: {0}")]
    Open(String),

    /// The requested sheet does not exist.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// The workbook contains no sheets.
    #[error("dataset contains no sheets")]
    NoSheets,

    /// The sheet has fewer rows than the header offset requires.
    #[error("sheet '{sheet}' has no header at row {row}")]
    MissingHeader { sheet: String, row: usize },

    /// The file extension is not a supported dataset format.
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors related to code extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The inferred pattern could not be compiled.
    #[error("invalid inferred pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors related to reconciliation against the master dataset.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The dataset lacks the key column codes are looked up by.
    #[error("dataset has no '{0}' column")]
    MissingKeyColumn(String),
}

/// Errors related to report generation.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Spreadsheet writer failure.
    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV writer failure.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The report has more columns than a worksheet can hold.
    #[error("too many columns for a worksheet: {0}")]
    TooManyColumns(usize),
}

/// Result type for the palletscan library.
pub type Result<T> = std::result::Result<T, PalletError>;
