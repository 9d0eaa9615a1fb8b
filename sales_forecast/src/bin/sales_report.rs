//! Compare weekly sales models on a CSV file.
//!
//! Usage:
//! ```text
//! sales_report Walmart_Store_sales.csv --store 5 --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use sales_forecast::config::ReportConfig;
use sales_forecast::data::DataLoader;
use sales_forecast::pipeline::ReportPipeline;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare weekly retail sales models")]
struct Args {
    /// Input CSV with Store, Date, Weekly_Sales, Holiday_Flag, Temperature,
    /// Fuel_Price, CPI and Unemployment columns
    input: PathBuf,

    /// Store modelled by seasonal ARIMA (overrides the config file)
    #[arg(short, long)]
    store: Option<u32>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Write the enriched feature table to this CSV file
    #[arg(long)]
    export_features: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    if let Some(store) = args.store {
        config.arima_store = store;
    }
    config.validate()?;

    let records = DataLoader::from_csv(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let pipeline = ReportPipeline::new(config);
    let table = pipeline.build_features(&records)?;

    if let Some(path) = &args.export_features {
        table
            .write_csv(path)
            .with_context(|| format!("exporting features to {}", path.display()))?;
        info!(path = %path.display(), rows = table.len(), "exported feature table");
    }

    let report = pipeline.run(&table)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
