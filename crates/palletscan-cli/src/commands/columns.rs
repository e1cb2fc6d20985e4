//! Columns command - list what a master dataset offers before processing.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::json;

use palletscan_core::{DatasetFormat, DatasetReader};

use super::{load_config, read_input};

/// Arguments for the columns command.
#[derive(Args)]
pub struct ColumnsArgs {
    /// Master dataset (xlsx, xlsm, xls, xlsb, ods or csv)
    #[arg(required = true)]
    dataset: PathBuf,

    /// Sheet to list (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ColumnsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let data = read_input(&args.dataset, "Dataset")?;
    let format = DatasetFormat::from_path(&args.dataset)?;
    let sheet = args.sheet.as_deref().or(config.dataset.sheet.as_deref());

    let reader = DatasetReader::new(&data, format, config.dataset.header_row);
    let sheets = reader.sheet_names()?;
    let columns = reader.read_columns(sheet)?;
    let suggested = config.suggested_columns(&columns);
    let has_key = columns.contains(&config.dataset.key_column);

    if args.json {
        let value = json!({
            "sheets": sheets,
            "columns": columns,
            "suggested": suggested,
            "key_column": config.dataset.key_column,
            "has_key_column": has_key,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Sheets: {}", sheets.join(", "));
    println!();
    println!("Columns:");
    for column in &columns {
        if suggested.contains(column) {
            println!("  {} {}", style("*").green(), column);
        } else {
            println!("    {}", column);
        }
    }
    println!();
    println!(
        "{} {} suggested of {} columns (marked with *)",
        style("ℹ").blue(),
        suggested.iter().filter(|c| columns.contains(c)).count(),
        columns.len()
    );

    if !has_key {
        eprintln!(
            "{} Key column '{}' not found; processing this sheet will fail.",
            style("⚠").yellow(),
            config.dataset.key_column
        );
    }

    Ok(())
}
