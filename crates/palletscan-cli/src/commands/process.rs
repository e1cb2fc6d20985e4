//! Process command - extract pallets from a PDF and build the report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, info};

use palletscan_core::{
    report_file_name, write_csv, DatasetFormat, DatasetReader, PalletConfig, Pipeline,
    RunOutcome, RunRequest, RunStatus, XlsxReportWriter,
};

use super::{load_config, read_input};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Shipment PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Master dataset (xlsx, xlsm, xls, xlsb, ods or csv)
    #[arg(short, long)]
    dataset: PathBuf,

    /// Sheet of the dataset to read (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Report columns, comma separated (default: suggested fields found in the dataset)
    #[arg(long, value_delimiter = ',', conflicts_with = "all_columns")]
    columns: Vec<String>,

    /// Report every dataset column
    #[arg(long)]
    all_columns: bool,

    /// Output file (xlsx default: Pallets_<container>.xlsx, otherwise stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Print averages of the quality columns
    #[arg(long)]
    show_averages: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Excel workbook
    Xlsx,
    /// CSV with a header row
    Csv,
    /// JSON summary with one object per row
    Json,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let document = read_input(&args.input, "Input file")?;
    let dataset = read_input(&args.dataset, "Dataset")?;
    let dataset_format = DatasetFormat::from_path(&args.dataset)?;
    let sheet: Option<String> = args.sheet.clone().or_else(|| config.dataset.sheet.clone());
    let sheet = sheet.as_deref();

    let columns = resolve_columns(&args, &config, &dataset, dataset_format, sheet)?;
    debug!("Report columns: {:?}", columns);

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("Matching pallets...");

    let pipeline = Pipeline::new(config);
    let request = RunRequest {
        document: &document,
        dataset: &dataset,
        dataset_format,
        sheet,
        columns: &columns,
    };

    let outcome = pipeline.run(&request, &mut |done: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };

    pb.finish_with_message("Done");

    if outcome.status != RunStatus::Completed {
        eprintln!("{} {}", style("⚠").yellow(), outcome.status_message());
        return Ok(());
    }

    eprintln!(
        "{} {} ({})",
        style("✓").green(),
        outcome.status_message(),
        outcome.identifier
    );

    write_output(&args, pipeline.config(), &outcome)?;

    if args.show_averages {
        eprintln!();
        eprintln!("{} Averages:", style("ℹ").blue());
        for line in outcome.averages.to_string().lines() {
            eprintln!("  {}", line);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Columns from `--columns`, `--all-columns`, or the suggested fields.
fn resolve_columns(
    args: &ProcessArgs,
    config: &PalletConfig,
    dataset: &[u8],
    format: DatasetFormat,
    sheet: Option<&str>,
) -> anyhow::Result<Vec<String>> {
    if !args.columns.is_empty() {
        return Ok(args
            .columns
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect());
    }

    if dataset.is_empty() {
        // Left to the pipeline, which reports the missing dataset.
        return Ok(vec![config.report.composite_column.clone()]);
    }

    let reader = DatasetReader::new(dataset, format, config.dataset.header_row);
    let available = reader.read_columns(sheet)?;

    if args.all_columns {
        let mut columns = vec![config.report.composite_column.clone()];
        columns.extend(available);
        Ok(columns)
    } else {
        Ok(config.suggested_columns(&available))
    }
}

fn write_output(args: &ProcessArgs, config: &PalletConfig, outcome: &RunOutcome) -> anyhow::Result<()> {
    let bytes = match args.format {
        OutputFormat::Xlsx => XlsxReportWriter::from_config(&config.report).write(&outcome.report)?,
        OutputFormat::Csv => write_csv(&outcome.report)?,
        OutputFormat::Json => {
            let value = json!({
                "identifier": outcome.identifier,
                "status": outcome.status,
                "message": outcome.status_message(),
                "diagnostics": outcome.diagnostics,
                "averages": outcome.averages,
                "rows": outcome.report.records(),
                "processing_time_ms": outcome.processing_time_ms,
            });
            serde_json::to_string_pretty(&value)?.into_bytes()
        }
    };

    let output_path = match (&args.output, args.format) {
        (Some(path), _) => Some(path.clone()),
        (None, OutputFormat::Xlsx) => Some(PathBuf::from(report_file_name(&outcome.identifier.value))),
        (None, _) => None,
    };

    match output_path {
        Some(path) => {
            fs::write(&path, &bytes)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", String::from_utf8_lossy(&bytes).trim_end()),
    }

    Ok(())
}
