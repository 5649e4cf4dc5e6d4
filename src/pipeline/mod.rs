// src/pipeline/mod.rs

//! End-to-end aggregation pipeline.
//!
//! Scrape all platforms concurrently, merge and consolidate the results,
//! export them to CSV, and hand them to the record sync service. Only setup
//! failures are fatal; sync failures degrade to a warning.

pub mod merge;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use crate::error::Result;
use crate::export;
use crate::location::LocationClassifier;
use crate::models::Config;
use crate::scrapers::orchestrator;
use crate::sync::{self, SyncStats};
use crate::utils::http;

/// Counts from one aggregation run.
#[derive(Debug)]
pub struct RunSummary {
    /// US postings returned by the adapters, before merging
    pub scraped: usize,

    /// Final deduplicated posting count
    pub merged: usize,

    /// CSV path, when anything was exported
    pub csv_path: Option<PathBuf>,

    /// Sync outcome, when sync ran
    pub sync: Option<SyncStats>,
}

/// Run the full aggregation pipeline.
pub async fn run(config: &Config, skip_sync: bool) -> Result<RunSummary> {
    log::info!("Starting job aggregation run");

    let classifier = Arc::new(LocationClassifier::new(
        &config.geocoder,
        &config.fetch.user_agent,
    ));
    let client = http::create_client(&config.fetch)?;

    let (ashby, greenhouse, lever) = orchestrator::run_all(config, &client, &classifier).await?;
    let scraped = ashby.len() + greenhouse.len() + lever.len();

    log::info!("Processing and deduplicating results...");
    let today = Local::now().date_naive();
    let final_postings = merge::merge(
        ashby,
        greenhouse,
        lever,
        &classifier,
        today,
        config.filter.max_age_days,
    );

    let cache_stats = classifier.cache_stats();
    log::info!(
        "Location cache: {} entries ({} US, {} non-US)",
        cache_stats.total,
        cache_stats.us,
        cache_stats.non_us
    );

    let csv_path = export::write_csv(&final_postings, &config.export.output_dir, None)?;

    let sync_stats = if skip_sync || !config.sync.enabled {
        log::info!("Record sync skipped");
        None
    } else {
        match sync::run_sync(&config.sync, &final_postings).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                // A broken sync must not fail the run; the CSV already exists.
                log::warn!("Record sync failed: {e}");
                None
            }
        }
    };

    log::info!("Job aggregation completed: {} postings", final_postings.len());
    Ok(RunSummary {
        scraped,
        merged: final_postings.len(),
        csv_path,
        sync: sync_stats,
    })
}
