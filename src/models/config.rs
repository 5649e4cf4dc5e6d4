//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::JobSource;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and concurrency settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Role-relevance and recency filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Geocoding fallback settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Record sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Organizations with Ashby boards
    #[serde(default)]
    pub ashby: Vec<Organization>,

    /// Organizations with Greenhouse boards
    #[serde(default)]
    pub greenhouse: Vec<Organization>,

    /// Organizations with Lever boards
    #[serde(default)]
    pub lever: Vec<Organization>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.connect_timeout_secs == 0 {
            return Err(AppError::validation(
                "fetch.connect_timeout_secs must be > 0",
            ));
        }
        for source in JobSource::ALL {
            if self.max_concurrent(source) == 0 {
                return Err(AppError::validation(format!(
                    "fetch.concurrency for {source} must be > 0"
                )));
            }
        }
        if self.filter.keywords.is_empty() {
            return Err(AppError::validation("No filter keywords defined"));
        }
        if self.filter.max_age_days <= 0 {
            return Err(AppError::validation("filter.max_age_days must be > 0"));
        }
        if self.geocoder.min_interval_ms == 0 {
            return Err(AppError::validation(
                "geocoder.min_interval_ms must be > 0",
            ));
        }
        for org in self.organizations_iter() {
            if org.name.trim().is_empty() {
                return Err(AppError::validation("Organization with empty name"));
            }
            if org.slug.is_empty() && org.url.is_empty() {
                return Err(AppError::validation(format!(
                    "Organization '{}' has neither slug nor url",
                    org.name
                )));
            }
        }
        Ok(())
    }

    /// Organizations configured for a platform.
    pub fn organizations(&self, source: JobSource) -> &[Organization] {
        match source {
            JobSource::Ashby => &self.ashby,
            JobSource::Greenhouse => &self.greenhouse,
            JobSource::Lever => &self.lever,
        }
    }

    /// Concurrency limit for a platform's orchestrator.
    pub fn max_concurrent(&self, source: JobSource) -> usize {
        match source {
            JobSource::Ashby => self.fetch.concurrency.ashby,
            JobSource::Greenhouse => self.fetch.concurrency.greenhouse,
            JobSource::Lever => self.fetch.concurrency.lever,
        }
    }

    fn organizations_iter(&self) -> impl Iterator<Item = &Organization> {
        self.ashby
            .iter()
            .chain(self.greenhouse.iter())
            .chain(self.lever.iter())
    }
}

/// HTTP client and concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Overall request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum idle pooled connections per host
    #[serde(default = "defaults::pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Per-platform concurrency limits
    #[serde(default)]
    pub concurrency: Concurrency,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            connect_timeout_secs: defaults::connect_timeout(),
            pool_max_idle_per_host: defaults::pool_max_idle_per_host(),
            concurrency: Concurrency::default(),
        }
    }
}

/// Per-platform orchestrator concurrency limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concurrency {
    #[serde(default = "defaults::ashby_concurrency")]
    pub ashby: usize,

    #[serde(default = "defaults::board_api_concurrency")]
    pub greenhouse: usize,

    #[serde(default = "defaults::board_api_concurrency")]
    pub lever: usize,
}

impl Default for Concurrency {
    fn default() -> Self {
        Self {
            ashby: defaults::ashby_concurrency(),
            greenhouse: defaults::board_api_concurrency(),
            lever: defaults::board_api_concurrency(),
        }
    }
}

/// Role-relevance and recency filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Case-insensitive substrings; a posting survives when its title
    /// contains any of them.
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Postings older than this are dropped (unparseable dates are kept)
    #[serde(default = "defaults::max_age_days")]
    pub max_age_days: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            max_age_days: defaults::max_age_days(),
        }
    }
}

/// Geocoding fallback settings for the location classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Disable to skip the network fallback entirely
    #[serde(default = "defaults::geocoder_enabled")]
    pub enabled: bool,

    /// Geocoding search endpoint
    #[serde(default = "defaults::geocoder_endpoint")]
    pub endpoint: String,

    /// Minimum spacing between geocoding calls, shared by all callers
    #[serde(default = "defaults::geocoder_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Per-call timeout in seconds
    #[serde(default = "defaults::geocoder_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::geocoder_enabled(),
            endpoint: defaults::geocoder_endpoint(),
            min_interval_ms: defaults::geocoder_min_interval_ms(),
            timeout_secs: defaults::geocoder_timeout(),
        }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported CSV files
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
        }
    }
}

/// Record sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Disable to skip record sync after export
    #[serde(default)]
    pub enabled: bool,

    /// Path of the local skip-cache file
    #[serde(default = "defaults::sync_cache_path")]
    pub cache_path: PathBuf,

    /// Skip-cache is cleared when its last sync is older than this
    #[serde(default = "defaults::sync_cache_max_age_days")]
    pub cache_max_age_days: i64,

    /// API token; falls back to the NOTION_API_TOKEN environment variable
    #[serde(default)]
    pub token: Option<String>,

    /// Target database id; falls back to NOTION_DATABASE_ID
    #[serde(default)]
    pub database_id: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_path: defaults::sync_cache_path(),
            cache_max_age_days: defaults::sync_cache_max_age_days(),
            token: None,
            database_id: None,
        }
    }
}

/// A configured employer/entity to scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Display name
    pub name: String,

    /// Platform-specific board/company slug
    #[serde(default)]
    pub slug: String,

    /// Direct board URL; takes precedence over the slug-templated endpoint
    #[serde(default)]
    pub url: String,

    /// Attribute postings to a sub-entity name found on each posting
    #[serde(default)]
    pub is_portfolio: bool,
}

mod defaults {
    use std::path::PathBuf;

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn connect_timeout() -> u64 {
        15
    }
    pub fn pool_max_idle_per_host() -> usize {
        5
    }
    pub fn ashby_concurrency() -> usize {
        10
    }
    pub fn board_api_concurrency() -> usize {
        8
    }

    // Filter defaults
    pub fn keywords() -> Vec<String> {
        [
            // Customer-facing engineering roles
            "forward deployed engineer",
            "forward deployed",
            "forward deployment engineer",
            "forward deployed ai engineer",
            "customer engineer",
            "solutions engineer",
            "solution engineer",
            "field engineer",
            "technical account manager",
            "customer success engineer",
            "implementation engineer",
            "deployment engineer",
            // AI engineering roles
            "ai engineer",
            "genai engineer",
            "ai developer",
            "machine learning engineer",
            "agent engineer",
            // General engineering roles
            "software engineer",
            "full stack engineer",
            "backend engineer",
            "frontend engineer",
            "product engineer",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn max_age_days() -> i64 {
        365
    }

    // Geocoder defaults
    pub fn geocoder_enabled() -> bool {
        true
    }
    pub fn geocoder_endpoint() -> String {
        "https://nominatim.openstreetmap.org/search".into()
    }
    pub fn geocoder_min_interval_ms() -> u64 {
        1100
    }
    pub fn geocoder_timeout() -> u64 {
        3
    }

    // Export defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("data/output")
    }

    // Sync defaults
    pub fn sync_cache_path() -> PathBuf {
        PathBuf::from("data/synced_jobs.json")
    }
    pub fn sync_cache_max_age_days() -> i64 {
        30
    }
}
