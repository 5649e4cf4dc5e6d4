//! Normalized posting schema shared by every source adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which ATS platform produced a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobSource {
    Ashby,
    Greenhouse,
    Lever,
}

impl JobSource {
    /// All supported platforms, in aggregation order.
    pub const ALL: [JobSource; 3] = [JobSource::Ashby, JobSource::Greenhouse, JobSource::Lever];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Ashby => "Ashby",
            JobSource::Greenhouse => "Greenhouse",
            JobSource::Lever => "Lever",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ashby" => Ok(JobSource::Ashby),
            "greenhouse" => Ok(JobSource::Greenhouse),
            "lever" => Ok(JobSource::Lever),
            other => Err(format!(
                "unknown platform '{other}' (expected ashby, greenhouse or lever)"
            )),
        }
    }
}

/// A normalized job posting.
///
/// Every adapter produces this schema regardless of platform. All fields are
/// always present; absent source data becomes an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Job title
    pub role_name: String,

    /// Hiring company. For portfolio organizations this may be a sub-entity
    /// name taken from the posting rather than the configured name.
    pub company_name: String,

    /// Free-text location. Becomes a `"; "`-joined list after consolidation.
    pub location: String,

    /// Canonical URL of the posting
    pub job_link: String,

    /// Employment type, defaulted per source when absent
    pub employment_type: String,

    /// Team or department name
    pub team: String,

    /// Publication date, normalized to `YYYY-MM-DD` (empty if unknown)
    pub published_date: String,

    /// Free-text compensation summary
    pub compensation: String,

    /// Platform the posting came from
    pub source: JobSource,

    /// Source-native identifier, used for sync idempotency
    pub job_id: String,
}

impl Posting {
    /// Exact-duplicate key: lower-cased company, role and location.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.company_name.to_lowercase(),
            self.role_name.to_lowercase(),
            self.location.to_lowercase()
        )
    }

    /// Consolidation key: lower-cased company and role.
    pub fn consolidation_key(&self) -> String {
        format!(
            "{}|{}",
            self.company_name.to_lowercase(),
            self.role_name.to_lowercase()
        )
    }

    /// Stable key for the record sync skip-cache.
    ///
    /// Falls back to a company/role/location slug when the source gave no
    /// native job id.
    pub fn sync_key(&self) -> String {
        if self.job_id.is_empty() {
            let slug = format!(
                "{}_{}_{}",
                self.company_name, self.role_name, self.location
            )
            .replace(' ', "_")
            .to_lowercase();
            format!("{}_{}", self.source, slug)
        } else {
            format!("{}_{}", self.source, self.job_id)
        }
    }
}

/// Per-organization filtering counters, logged once per adapter invocation.
#[derive(Debug, Default)]
pub struct JobStats {
    pub total: usize,
    pub us: usize,
    pub non_us: usize,
    pub non_us_locations: Vec<String>,
}

impl JobStats {
    pub fn add_us(&mut self) {
        self.us += 1;
        self.total += 1;
    }

    pub fn add_non_us(&mut self, location: String) {
        self.non_us += 1;
        self.total += 1;
        if !location.is_empty() {
            self.non_us_locations.push(location);
        }
    }

    /// Log the counters for one organization or filter stage.
    pub fn log(&self, context: &str) {
        log::info!("{context} statistics:");
        log::info!("  Total postings: {}", self.total);
        log::info!("  US postings: {}", self.us);
        log::info!("  Non-US postings: {}", self.non_us);
        if !self.non_us_locations.is_empty() {
            log::info!("  Non-US locations: {}", self.non_us_locations.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting() -> Posting {
        Posting {
            role_name: "Forward Deployed Engineer".to_string(),
            company_name: "TestCorp".to_string(),
            location: "San Francisco, CA".to_string(),
            job_link: "https://example.com/job/1".to_string(),
            employment_type: "FullTime".to_string(),
            team: "Engineering".to_string(),
            published_date: "2026-07-08".to_string(),
            compensation: "Not disclosed".to_string(),
            source: JobSource::Ashby,
            job_id: "abc123".to_string(),
        }
    }

    #[test]
    fn dedup_key_is_case_insensitive() {
        let a = sample_posting();
        let mut b = sample_posting();
        b.company_name = "TESTCORP".to_string();
        b.location = "san francisco, ca".to_string();
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn consolidation_key_ignores_location() {
        let a = sample_posting();
        let mut b = sample_posting();
        b.location = "Remote".to_string();
        assert_eq!(a.consolidation_key(), b.consolidation_key());
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn sync_key_uses_native_id() {
        let posting = sample_posting();
        assert_eq!(posting.sync_key(), "Ashby_abc123");
    }

    #[test]
    fn sync_key_falls_back_to_slug() {
        let mut posting = sample_posting();
        posting.job_id = String::new();
        assert_eq!(
            posting.sync_key(),
            "Ashby_testcorp_forward_deployed_engineer_san_francisco,_ca"
        );
    }

    #[test]
    fn source_round_trips_from_str() {
        assert_eq!("ashby".parse::<JobSource>(), Ok(JobSource::Ashby));
        assert_eq!("Lever".parse::<JobSource>(), Ok(JobSource::Lever));
        assert!("workday".parse::<JobSource>().is_err());
    }

    #[test]
    fn stats_track_non_us_locations() {
        let mut stats = JobStats::default();
        stats.add_us();
        stats.add_non_us("London, UK".to_string());
        stats.add_non_us(String::new());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.us, 1);
        assert_eq!(stats.non_us, 2);
        assert_eq!(stats.non_us_locations, vec!["London, UK".to_string()]);
    }
}
