//! JobScout CLI
//!
//! Local execution entry point for the job aggregation pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobscout::{
    error::Result,
    export,
    location::LocationClassifier,
    models::{Config, JobSource},
    pipeline,
    scrapers::{for_source, Orchestrator},
    utils::http,
};

/// JobScout - multi-source job posting aggregator
#[derive(Parser, Debug)]
#[command(
    name = "jobscout",
    version,
    about = "Aggregates job postings from Ashby, Greenhouse and Lever boards"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: scrape, merge, export, sync
    Run {
        /// Skip the record sync step even when configured
        #[arg(long)]
        no_sync: bool,
    },

    /// Scrape a single platform and export the result
    Scrape {
        /// Platform to scrape (ashby, greenhouse, lever)
        platform: JobSource,
    },

    /// Classify one location string as US or non-US
    Classify {
        /// Location text, e.g. "Remote - US" or "London, UK"
        location: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("JobScout starting...");

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run { no_sync } => {
            config.validate()?;
            let summary = pipeline::run(&config, no_sync).await?;

            log::info!(
                "Run complete: {} scraped, {} after merge",
                summary.scraped,
                summary.merged
            );
            if let Some(path) = &summary.csv_path {
                log::info!("CSV written to {}", path.display());
            }
        }

        Command::Scrape { platform } => {
            config.validate()?;
            let classifier = Arc::new(LocationClassifier::new(
                &config.geocoder,
                &config.fetch.user_agent,
            ));
            let client = http::create_client(&config.fetch)?;

            let orchestrator = Orchestrator::new(
                for_source(platform, &config.filter.keywords, Arc::clone(&classifier)),
                config.max_concurrent(platform),
            );
            let postings = orchestrator
                .scrape_all(&client, config.organizations(platform))
                .await;

            log::info!("{platform}: {} US postings", postings.len());
            if let Some(path) =
                export::write_csv(&postings, &config.export.output_dir, None)?
            {
                log::info!("CSV written to {}", path.display());
            }
        }

        Command::Classify { location } => {
            let classifier =
                LocationClassifier::new(&config.geocoder, &config.fetch.user_agent);
            let is_us = classifier.classify(&location).await;
            println!("{location}: {}", if is_us { "US" } else { "non-US" });
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {e}");
                return Err(e);
            }
            let orgs = config.ashby.len() + config.greenhouse.len() + config.lever.len();
            log::info!("✓ Config OK ({orgs} organizations configured)");
        }
    }

    Ok(())
}
