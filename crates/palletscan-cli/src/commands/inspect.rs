//! Inspect command - extraction diagnostics for a single PDF.

use std::path::PathBuf;

use clap::Args;
use console::style;

use palletscan_core::{DocumentScan, PalletError, Pipeline};

use super::{load_config, read_input};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Shipment PDF
    #[arg(required = true)]
    input: PathBuf,

    /// List every extracted code
    #[arg(long)]
    show_codes: bool,

    /// Print the scan as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let data = read_input(&args.input, "Input file")?;
    if data.is_empty() {
        return Err(PalletError::MissingInput("document".to_string()).into());
    }

    let pipeline = Pipeline::new(config);
    let text = pipeline.read_document(&data)?;
    let scan = pipeline.inspect(&text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scan)?);
    } else {
        print!("{}", format_scan(&scan, args.show_codes));
    }

    Ok(())
}

fn format_scan(scan: &DocumentScan, show_codes: bool) -> String {
    let mut output = String::new();

    let marker = if scan.identifier.detected {
        style("✓").green()
    } else {
        style("⚠").yellow()
    };
    output.push_str(&format!("{} Container: {}\n", marker, scan.identifier));
    output.push_str(&format!("Candidates: {}\n", scan.inference.candidates));

    match &scan.inference.pattern {
        Some(pattern) => output.push_str(&format!(
            "Pattern: prefix {} / suffix {} ({})\n",
            pattern.prefix(),
            pattern.suffix(),
            pattern
        )),
        None => output.push_str("Pattern: undefined\n"),
    }

    output.push_str(&format!("Captures: {}\n", scan.codes.captures));
    if scan.codes.malformed > 0 {
        output.push_str(&format!("Malformed: {}\n", scan.codes.malformed));
    }
    output.push_str(&format!("Codes: {}\n", scan.codes.codes.len()));

    if show_codes {
        for code in &scan.codes.codes {
            output.push_str(&format!("  {}\n", code));
        }
    }

    output
}
