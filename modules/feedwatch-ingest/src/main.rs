//! `feedwatch`: run one feed ingestion and append new records to the output
//! directory.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use feedwatch_common::Config;
use feedwatch_ingest::{ingest, HttpFetcher, JsonlStore, Source};
use feedwatch_pipeline::{BorderIndex, CountryLookup, NoCountryLookup};

#[derive(Parser)]
#[command(name = "feedwatch")]
#[command(about = "Disaster and conflict feed ingestion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the GDACS alert feed
    Gdacs,

    /// Ingest GDACS annotated for IDMC hazard monitoring
    HazardMonitoring,

    /// Ingest ACLED conflict events
    Acled {
        /// Stop after this many result pages
        #[arg(long, env = "FEEDWATCH_ACLED_MAX_PAGES")]
        max_pages: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("feedwatch: run failed: {e:#}");
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("feedwatch=info".parse()?))
        .init();

    let mut config = Config::from_env();
    let source = match cli.command {
        Commands::Gdacs => Source::Gdacs,
        Commands::HazardMonitoring => Source::HazardMonitoring,
        Commands::Acled { max_pages } => {
            if let Some(max_pages) = max_pages {
                config.acled_max_pages = max_pages;
            }
            Source::Acled
        }
    };
    config.log_redacted();
    info!(source = source.name(), "feedwatch starting");

    let fetcher = HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;
    let store = JsonlStore::open(config.output_dir.join(format!("{}.jsonl", source.name())))
        .await
        .context("Failed to open record store")?;

    let countries: Arc<dyn CountryLookup> = match (&config.borders_path, source) {
        (Some(path), Source::HazardMonitoring) => Arc::new(BorderIndex::load(path).await?),
        (None, Source::HazardMonitoring) => {
            warn!("FEEDWATCH_BORDERS not set, country fields will be null");
            Arc::new(NoCountryLookup)
        }
        _ => Arc::new(NoCountryLookup),
    };

    let summary = ingest(source, &config, &fetcher, &store, countries)
        .await
        .with_context(|| format!("{source} ingestion failed"))?;

    println!("{summary}");
    Ok(())
}
