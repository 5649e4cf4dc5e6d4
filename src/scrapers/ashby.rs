//! Ashby board adapter.
//!
//! Ashby boards are served as HTML with the posting data embedded in a
//! `window.__appData = {...};` assignment, so this adapter extracts that
//! JSON blob by regex instead of hitting a REST endpoint.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::location::LocationClassifier;
use crate::models::{JobSource, Organization, Posting};
use crate::utils::date;

use super::{JobScraper, filter_relevant, id_field, normalize_keywords, partition_us, str_field};

static APP_DATA_RE: OnceLock<Regex> = OnceLock::new();

fn app_data_re() -> &'static Regex {
    APP_DATA_RE.get_or_init(|| {
        Regex::new(r"(?s)window\.__appData\s*=\s*(\{.*?\});").expect("invalid appData pattern")
    })
}

pub struct AshbyScraper {
    keywords: Vec<String>,
    classifier: Arc<LocationClassifier>,
}

impl AshbyScraper {
    pub fn new(keywords: &[String], classifier: Arc<LocationClassifier>) -> Self {
        Self {
            keywords: normalize_keywords(keywords),
            classifier,
        }
    }

    /// Locate and parse the embedded `window.__appData` JSON.
    fn extract_app_data(html: &str) -> Result<Value> {
        let captures = app_data_re()
            .captures(html)
            .ok_or_else(|| AppError::validation("window.__appData not found in board HTML"))?;
        Ok(serde_json::from_str(&captures[1])?)
    }

    fn board_url(org: &Organization) -> String {
        if org.url.is_empty() {
            format!("https://jobs.ashbyhq.com/{}", org.slug)
        } else {
            org.url.clone()
        }
    }

    async fn fetch(&self, client: &Client, org: &Organization) -> Result<Vec<Posting>> {
        let response = client.get(Self::board_url(org)).send().await?;
        if !response.status().is_success() {
            return Err(AppError::scrape(
                &org.name,
                format!("HTTP {}", response.status()),
            ));
        }
        let html = response.text().await?;

        let app_data = Self::extract_app_data(&html)?;
        let raw_postings = app_data
            .pointer("/jobBoard/jobPostings")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        log::info!("Found {} jobs from {}", raw_postings.len(), org.name);

        let relevant = filter_relevant(raw_postings, &self.keywords);
        log::info!("Filtered {} matching jobs from {}", relevant.len(), org.name);

        Ok(relevant
            .iter()
            .map(|job| Self::normalize(job, org))
            .collect())
    }

    fn normalize(job: &Value, org: &Organization) -> Posting {
        // Portfolio boards list postings for many companies; the department
        // name carries the actual sub-entity.
        let company_name = if org.is_portfolio {
            let department = str_field(job, "departmentName");
            if department.is_empty() {
                org.name.clone()
            } else {
                department
            }
        } else {
            org.name.clone()
        };

        let job_id = id_field(job, "id");
        let compensation = str_field(job, "compensationTierSummary");

        Posting {
            role_name: str_field(job, "title"),
            company_name,
            location: str_field(job, "locationName"),
            job_link: format!("https://jobs.ashbyhq.com/{}/{}", org.slug, job_id),
            employment_type: str_field(job, "employmentType"),
            team: str_field(job, "teamName"),
            published_date: date::date_only(&str_field(job, "publishedDate")),
            compensation: if compensation.is_empty() {
                "Not disclosed".to_string()
            } else {
                compensation
            },
            source: JobSource::Ashby,
            job_id,
        }
    }
}

#[async_trait]
impl JobScraper for AshbyScraper {
    fn source(&self) -> JobSource {
        JobSource::Ashby
    }

    async fn scrape(&self, client: &Client, org: &Organization) -> Vec<Posting> {
        log::info!("Starting Ashby scrape of {}...", org.name);
        match self.fetch(client, org).await {
            Ok(postings) => partition_us(postings, &self.classifier, &org.name).await,
            Err(e) => {
                log::error!("Error scraping {}: {}", org.name, e);
                Vec::new()
            }
        }
    }
}
