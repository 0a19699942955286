//! Titles EDA - command line entry point
//!
//! Without flags, runs the fixed workflow from the working directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use titles_eda::{workflow, WorkflowConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis of a media titles dataset",
    long_about = "Cleans the titles dataset and writes charts to the graphs directory \
                  and tables to the CSV directory. Both directories must exist."
)]
struct Args {
    /// JSON file with workflow parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the titles CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for SVG charts
    #[arg(long)]
    graphs_dir: Option<PathBuf>,

    /// Directory for CSV tables
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = match &args.config {
        Some(path) => WorkflowConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => WorkflowConfig::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(graphs_dir) = args.graphs_dir {
        config.graphs_dir = graphs_dir;
    }
    if let Some(csv_dir) = args.csv_dir {
        config.csv_dir = csv_dir;
    }

    let artifacts = workflow::run(&config)?;
    info!("Done: {} artifacts", artifacts.len());
    Ok(())
}
