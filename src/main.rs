use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use donation_map::config::Config;
use donation_map::error::{DonationMapError, Result};
use donation_map::geocode::GoogleGeocoder;
use donation_map::logging;
use donation_map::pipeline::{Pipeline, RunOptions, RunReport};
use donation_map::sheets::SheetsRowSource;
use donation_map::types::{FanoutMode, RowSource};

/// Environment variable holding an already-issued Sheets access token.
const SHEETS_TOKEN_ENV: &str = "DONATION_MAP_SHEETS_TOKEN";
/// Environment fallback for the geocoding API key.
const GEOCODING_KEY_ENV: &str = "GEOCODING_API_KEY";

#[derive(Parser)]
#[command(name = "donation_map")]
#[command(about = "Geocodes donation spreadsheet rows into GeoJSON map points")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch rows, geocode them, and emit the feature collection
    Generate {
        /// Fan-out policy; overrides the configured output mode
        #[arg(long)]
        mode: Option<FanoutMode>,
        /// Write pretty-printed JSON to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Process rows and report per-row outcomes and failure counts
    /// instead of emitting the collection
    Audit {
        /// Fan-out policy; only affects the reported point count
        #[arg(long)]
        mode: Option<FanoutMode>,
    },
}

fn geocoding_api_key(config: &Config) -> Result<String> {
    match &config.geocoding.api_key {
        Some(key) => Ok(key.clone()),
        None => std::env::var(GEOCODING_KEY_ENV).map_err(|_| {
            DonationMapError::Config(format!(
                "geocoding api_key not configured and {GEOCODING_KEY_ENV} not set"
            ))
        }),
    }
}

async fn run_pipeline(config: &Config, options: RunOptions) -> Result<RunReport> {
    let token = std::env::var(SHEETS_TOKEN_ENV).map_err(|_| {
        DonationMapError::Config(format!("{SHEETS_TOKEN_ENV} not set"))
    })?;
    let source = SheetsRowSource::new(
        token,
        &config.spreadsheet.id,
        &config.spreadsheet.range,
        config.spreadsheet.timeout_seconds,
    )?;
    let geocoder = GoogleGeocoder::new(
        geocoding_api_key(config)?,
        config.geocoding.timeout_seconds,
    )?;

    info!("Fetching rows from {}", source.source_name());
    let rows = source.fetch_rows().await?;
    Ok(Pipeline::run(rows, &geocoder, options).await)
}

fn print_audit_summary(report: &RunReport) {
    println!("\n📊 Run summary:");
    println!("   Total rows: {}", report.total_rows);
    println!("   Geocoded: {}", report.records.len());
    println!("   Failed: {}", report.failed_rows());
    println!("   Points under {:?}: {}", report.mode, report.feature_collection().features.len());
    println!("   Finished at: {}", report.finished_at);

    for (kind, rows) in &report.failures {
        println!("\n⚠️  {} ({} rows):", kind, rows.len());
        for row in rows {
            println!("   - {row:?}");
        }
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Generate { mode, output } => {
            let mode = mode.or(config.output.mode).unwrap_or_default();
            let options = RunOptions { mode, debug: false };

            match run_pipeline(&config, options).await {
                Ok(report) => {
                    let collection = report.feature_collection();
                    info!(
                        "Emitting {} features from {} records ({} rows failed)",
                        collection.features.len(),
                        report.records.len(),
                        report.failed_rows()
                    );

                    match output {
                        Some(path) => {
                            fs::write(&path, serde_json::to_string_pretty(&collection)?)?;
                            println!("💾 Saved {} features to {}", collection.features.len(), path.display());
                        }
                        None => println!("{}", serde_json::to_string(&collection)?),
                    }
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Audit { mode } => {
            let mode = mode.or(config.output.mode).unwrap_or_default();
            let options = RunOptions { mode, debug: true };

            match run_pipeline(&config, options).await {
                Ok(report) => print_audit_summary(&report),
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
