//! Core library for pallet folio extraction and reconciliation.
//!
//! This crate provides:
//! - PDF text extraction (page-by-page, newline-joined)
//! - Container number lookup and statistical inference of the pallet code pattern
//! - Master dataset reading (xlsx/xls/ods/csv) with a header-only column listing
//! - Reconciliation of extracted folios against the dataset
//! - Report projection, XLSX export and quality column averages

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod extraction;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod reconcile;
pub mod report;

pub use aggregate::{average_columns, AverageSummary};
pub use dataset::{ColumnSelection, DatasetFormat, DatasetReader};
pub use error::{PalletError, Result};
pub use extraction::{
    infer_pattern, locate_identifier, CodeExtractor, ExtractedCodes, FieldExtractor, Inference,
    InferredPattern, ShipmentId,
};
pub use models::{Cell, MasterTable, PalletConfig, ReportTable};
pub use pdf::{PageText, PdfExtractor, PdfProcessor};
pub use pipeline::{Diagnostics, DocumentScan, Pipeline, RunOutcome, RunRequest, RunStatus};
pub use reconcile::{MatchedRow, NoProgress, ProgressSink, Reconciler, Reconciliation};
pub use report::{project, report_file_name, write_csv, XlsxReportWriter};
