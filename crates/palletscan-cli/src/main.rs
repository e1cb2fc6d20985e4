//! CLI application for pallet folio extraction and reconciliation.

mod commands;

use clap::{Parser, Subcommand};
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{columns, config, inspect, process};

/// Pallet folio extractor - match the pallets listed in a shipment PDF
/// against a quality master sheet
#[derive(Parser)]
#[command(name = "palletscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract pallets from a PDF and build the report
    Process(process::ProcessArgs),

    /// List the sheets and columns of a master dataset
    Columns(columns::ColumnsArgs),

    /// Show what the extractor finds in a PDF, without a dataset
    Inspect(inspect::InspectArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let result = match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Columns(args) => columns::run(args, cli.config.as_deref()).await,
        Commands::Inspect(args) => inspect::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    };

    // Report failures on a single line
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
