//! Greenhouse board adapter.
//!
//! Uses the public boards API, which returns plain JSON.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::location::LocationClassifier;
use crate::models::{JobSource, Organization, Posting};
use crate::utils::date;

use super::{JobScraper, filter_relevant, id_field, normalize_keywords, partition_us, str_field};

const API_URL: &str = "https://boards-api.greenhouse.io/v1/boards";

pub struct GreenhouseScraper {
    keywords: Vec<String>,
    classifier: Arc<LocationClassifier>,
}

impl GreenhouseScraper {
    pub fn new(keywords: &[String], classifier: Arc<LocationClassifier>) -> Self {
        Self {
            keywords: normalize_keywords(keywords),
            classifier,
        }
    }

    async fn fetch(&self, client: &Client, org: &Organization) -> Result<Vec<Posting>> {
        let api_url = format!("{}/{}/jobs", API_URL, org.slug);

        let response = client.get(&api_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::scrape(
                &org.name,
                format!("HTTP {}", response.status()),
            ));
        }

        let payload: Value = response.json().await?;
        let raw_postings = payload
            .get("jobs")
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
        let team = job
            .pointer("/departments/0/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Posting {
            role_name: str_field(job, "title"),
            company_name: org.name.clone(),
            location: job
                .pointer("/location/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            job_link: str_field(job, "absolute_url"),
            // The boards API does not expose an employment type.
            employment_type: "FullTime".to_string(),
            team,
            published_date: date::date_only(&str_field(job, "updated_at")),
            compensation: "Not disclosed".to_string(),
            source: JobSource::Greenhouse,
            job_id: id_field(job, "id"),
        }
    }
}

#[async_trait]
impl JobScraper for GreenhouseScraper {
    fn source(&self) -> JobSource {
        JobSource::Greenhouse
    }

    async fn scrape(&self, client: &Client, org: &Organization) -> Vec<Posting> {
        log::info!("Starting Greenhouse scrape of {}...", org.name);
        match self.fetch(client, org).await {
            Ok(postings) => partition_us(postings, &self.classifier, &org.name).await,
            Err(e) => {
                log::error!("Error scraping {}: {}", org.name, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org() -> Organization {
        Organization {
            name: "TestCorp".to_string(),
            slug: "testcorp".to_string(),
            url: String::new(),
            is_portfolio: false,
        }
    }

    #[test]
    fn normalizes_api_payload() {
        let raw = json!({
            "id": 4012345,
            "title": "Solutions Engineer",
            "location": {"name": "Denver, CO"},
            "absolute_url": "https://boards.greenhouse.io/testcorp/jobs/4012345",
            "departments": [{"name": "Customer Success"}],
            "updated_at": "2026-06-01T09:30:00-04:00"
        });
        let posting = GreenhouseScraper::normalize(&raw, &org());

        assert_eq!(posting.role_name, "Solutions Engineer");
        assert_eq!(posting.location, "Denver, CO");
        assert_eq!(
            posting.job_link,
            "https://boards.greenhouse.io/testcorp/jobs/4012345"
        );
        assert_eq!(posting.employment_type, "FullTime");
        assert_eq!(posting.team, "Customer Success");
        assert_eq!(posting.published_date, "2026-06-01");
        assert_eq!(posting.job_id, "4012345");
        assert_eq!(posting.source, JobSource::Greenhouse);
    }

    #[test]
    fn tolerates_missing_nested_fields() {
        let raw = json!({"title": "Engineer"});
        let posting = GreenhouseScraper::normalize(&raw, &org());
        assert_eq!(posting.location, "");
        assert_eq!(posting.team, "");
        assert_eq!(posting.published_date, "");
        assert_eq!(posting.job_id, "");
        assert_eq!(posting.compensation, "Not disclosed");
    }
}
