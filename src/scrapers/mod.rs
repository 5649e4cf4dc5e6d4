// src/scrapers/mod.rs

//! Source adapters for the supported ATS platforms.
//!
//! Every adapter implements [`JobScraper`]: fetch raw postings for one
//! organization, keep the role-relevant ones, normalize them into the common
//! [`Posting`] schema, and return only the US subset. The contract is
//! infallible — any network or payload failure is logged and yields an empty
//! list for that organization, never an error.

mod ashby;
mod greenhouse;
mod lever;
pub mod orchestrator;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub use ashby::AshbyScraper;
pub use greenhouse::GreenhouseScraper;
pub use lever::LeverScraper;
pub use orchestrator::Orchestrator;

use crate::location::LocationClassifier;
use crate::models::{JobSource, JobStats, Organization, Posting};

/// One source adapter per ATS platform.
#[async_trait]
pub trait JobScraper: Send + Sync {
    /// Platform this adapter serves.
    fn source(&self) -> JobSource;

    /// Fetch, filter and normalize postings for one organization.
    ///
    /// Never fails: transient and payload errors are logged and produce an
    /// empty list so one organization cannot abort a batch.
    async fn scrape(&self, client: &Client, org: &Organization) -> Vec<Posting>;
}

/// Static adapter registry keyed by platform.
pub fn for_source(
    source: JobSource,
    keywords: &[String],
    classifier: Arc<LocationClassifier>,
) -> Arc<dyn JobScraper> {
    match source {
        JobSource::Ashby => Arc::new(AshbyScraper::new(keywords, classifier)),
        JobSource::Greenhouse => Arc::new(GreenhouseScraper::new(keywords, classifier)),
        JobSource::Lever => Arc::new(LeverScraper::new(keywords, classifier)),
    }
}

/// Lower-cased copy of the configured keyword list.
fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

/// Read a string field from a raw posting, empty when absent.
fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read an identifier that may be encoded as string or number.
fn id_field(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Title of a raw posting, checked across the field names platforms use.
fn title_of(raw: &Value) -> &str {
    for key in ["title", "text", "role_name"] {
        if let Some(title) = raw.get(key).and_then(Value::as_str) {
            if !title.is_empty() {
                return title;
            }
        }
    }
    ""
}

/// Whether a title matches any configured keyword (substring, OR).
fn matches_keywords(title: &str, keywords: &[String]) -> bool {
    let lower = title.to_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
}

/// Keep the raw postings whose title matches a keyword.
fn filter_relevant(raw: Vec<Value>, keywords: &[String]) -> Vec<Value> {
    raw.into_iter()
        .filter(|job| matches_keywords(title_of(job), keywords))
        .collect()
}

/// Partition normalized postings into the US subset, logging per-org stats.
async fn partition_us(
    postings: Vec<Posting>,
    classifier: &LocationClassifier,
    org_name: &str,
) -> Vec<Posting> {
    let mut stats = JobStats::default();
    let mut us_postings = Vec::new();

    for posting in postings {
        if classifier.classify(&posting.location).await {
            stats.add_us();
            us_postings.push(posting);
        } else {
            stats.add_non_us(posting.location.clone());
        }
    }

    stats.log(org_name);
    us_postings
}
