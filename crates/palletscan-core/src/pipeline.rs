//! One extraction-and-report run.

use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{average_columns, AverageSummary};
use crate::dataset::{ColumnSelection, DatasetFormat, DatasetReader};
use crate::error::{PalletError, Result};
use crate::extraction::{
    infer_pattern, locate_identifier, CodeExtractor, ExtractedCodes, Inference, ShipmentId,
};
use crate::models::config::PalletConfig;
use crate::models::table::ReportTable;
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::reconcile::{ProgressSink, Reconciler};
use crate::report::project;

/// Inputs of a run, fully loaded in memory.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    /// PDF bytes.
    pub document: &'a [u8],
    /// Master dataset bytes.
    pub dataset: &'a [u8],
    /// Dataset file kind.
    pub dataset_format: DatasetFormat,
    /// Sheet to read; falls back to the configured sheet, then the first one.
    pub sheet: Option<&'a str>,
    /// Output columns, in order.
    pub columns: &'a [String],
}

/// Everything learned from a document's text alone.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentScan {
    pub identifier: ShipmentId,
    pub inference: Inference,
    pub codes: ExtractedCodes,
}

/// Counters reported to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Digit runs that voted on the pattern.
    pub candidates: usize,
    /// Pattern occurrences found in the text.
    pub captures: usize,
    /// Occurrences dropped as non-numeric.
    pub malformed: usize,
    /// Codes looked up in the dataset.
    pub attempted: usize,
    /// Codes that found a dataset row.
    pub matched: usize,
}

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// The document has no candidate codes; nothing was looked up.
    NoPalletsDetected,
    /// A pattern was inferred but it extracted no valid codes.
    NoValidCodes,
    /// Codes were looked up in the dataset.
    Completed,
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub identifier: ShipmentId,
    pub diagnostics: Diagnostics,
    pub status: RunStatus,
    pub report: ReportTable,
    pub averages: AverageSummary,
    pub processing_time_ms: u64,
}

impl RunOutcome {
    /// Human-readable status line.
    pub fn status_message(&self) -> String {
        match self.status {
            RunStatus::NoPalletsDetected => "No valid pallets detected in the document".to_string(),
            RunStatus::NoValidCodes => {
                "A pallet pattern was found but it yielded no valid codes".to_string()
            }
            RunStatus::Completed => format!(
                "{} of {} pallets matched",
                self.diagnostics.matched, self.diagnostics.attempted
            ),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_message())
    }
}

/// Runs extraction and reconciliation with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PalletConfig,
}

impl Pipeline {
    pub fn new(config: PalletConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PalletConfig {
        &self.config
    }

    /// Read the text stream of a PDF.
    pub fn read_document(&self, document: &[u8]) -> Result<String> {
        let extractor = PdfExtractor::from_bytes(document)?;
        Ok(extractor.extract_text()?)
    }

    /// Identifier, pattern and codes of a document's text.
    pub fn inspect(&self, text: &str) -> Result<DocumentScan> {
        let identifier = ShipmentId::resolve(
            locate_identifier(text),
            &self.config.extraction.unknown_identifier,
        );
        if !identifier.detected {
            warn!("No container number found, using '{}'", identifier.value);
        }

        let inference = infer_pattern(text);
        let codes = match &inference.pattern {
            Some(pattern) => CodeExtractor::new(pattern)?.normalize(text),
            None => ExtractedCodes::default(),
        };

        Ok(DocumentScan {
            identifier,
            inference,
            codes,
        })
    }

    /// Extract, reconcile and project one document against one dataset.
    pub fn run(&self, request: &RunRequest<'_>, progress: &mut dyn ProgressSink) -> Result<RunOutcome> {
        let start = Instant::now();

        if request.document.is_empty() {
            return Err(PalletError::MissingInput("document".to_string()));
        }
        if request.dataset.is_empty() {
            return Err(PalletError::MissingInput("dataset".to_string()));
        }
        if request.columns.is_empty() {
            return Err(PalletError::NoColumnsSelected);
        }

        let dataset_config = &self.config.dataset;
        let sheet = request.sheet.or(dataset_config.sheet.as_deref());
        let reader = DatasetReader::new(request.dataset, request.dataset_format, dataset_config.header_row);
        let selection = ColumnSelection::Columns(request.columns.to_vec());
        let master = reader.read_table(sheet, &dataset_config.key_column, &selection)?;

        let reconciler = Reconciler::new(dataset_config.key_column.clone());
        reconciler.check(&master)?;

        let text = self.read_document(request.document)?;
        let scan = self.inspect(&text)?;

        let mut diagnostics = Diagnostics {
            candidates: scan.inference.candidates,
            captures: scan.codes.captures,
            malformed: scan.codes.malformed,
            ..Default::default()
        };

        let status = if scan.inference.pattern.is_none() {
            RunStatus::NoPalletsDetected
        } else if scan.codes.is_empty() {
            RunStatus::NoValidCodes
        } else {
            RunStatus::Completed
        };

        let report = if status == RunStatus::Completed {
            let matched = reconciler.reconcile(&scan.codes.codes, &scan.identifier, &master, progress)?;
            diagnostics.attempted = matched.attempted;
            diagnostics.matched = matched.matched;
            project(&matched, request.columns, &self.config.report.composite_column)
        } else {
            debug!("Skipping reconciliation: {:?}", status);
            ReportTable {
                columns: request.columns.to_vec(),
                rows: Vec::new(),
            }
        };

        let averages = average_columns(&report, &self.config.aggregate.keywords);

        let outcome = RunOutcome {
            identifier: scan.identifier,
            diagnostics,
            status,
            report,
            averages,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };
        info!("{} ({})", outcome.status_message(), outcome.identifier);
        Ok(outcome)
    }
}
