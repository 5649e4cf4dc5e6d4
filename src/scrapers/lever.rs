//! Lever board adapter.
//!
//! Uses the public postings API. Responses are a top-level JSON array and
//! carry dates as epoch-millisecond timestamps.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::location::LocationClassifier;
use crate::models::{JobSource, Organization, Posting};
use crate::utils::date;

use super::{JobScraper, filter_relevant, id_field, normalize_keywords, partition_us, str_field};

const API_URL: &str = "https://api.lever.co/v0/postings";

pub struct LeverScraper {
    keywords: Vec<String>,
    classifier: Arc<LocationClassifier>,
}

impl LeverScraper {
    pub fn new(keywords: &[String], classifier: Arc<LocationClassifier>) -> Self {
        Self {
            keywords: normalize_keywords(keywords),
            classifier,
        }
    }

    async fn fetch(&self, client: &Client, org: &Organization) -> Result<Vec<Posting>> {
        let api_url = format!("{}/{}?mode=json", API_URL, org.slug);

        let response = client.get(&api_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::scrape(
                &org.name,
                format!("HTTP {}", response.status()),
            ));
        }

        let raw_postings: Vec<Value> = response.json().await?;
        log::info!("Found {} jobs from {}", raw_postings.len(), org.name);

        let relevant = filter_relevant(raw_postings, &self.keywords);
        log::info!("Filtered {} matching jobs from {}", relevant.len(), org.name);

        Ok(relevant
            .iter()
            .map(|job| Self::normalize(job, org))
            .collect())
    }

    fn normalize(job: &Value, org: &Organization) -> Posting {
        let categories = job.get("categories").cloned().unwrap_or(Value::Null);
        let commitment = str_field(&categories, "commitment");

        let published_date = job
            .get("createdAt")
            .and_then(Value::as_i64)
            .map(date::timestamp_millis_to_date)
            .unwrap_or_default();

        let job_id = id_field(job, "id");

        Posting {
            role_name: str_field(job, "text"),
            company_name: org.name.clone(),
            location: str_field(&categories, "location"),
            job_link: format!("https://jobs.lever.co/{}/{}", org.slug, job_id),
            employment_type: if commitment.is_empty() {
                "FullTime".to_string()
            } else {
                commitment
            },
            team: str_field(&categories, "team"),
            published_date,
            compensation: "Not disclosed".to_string(),
            source: JobSource::Lever,
            job_id,
        }
    }
}

#[async_trait]
impl JobScraper for LeverScraper {
    fn source(&self) -> JobSource {
        JobSource::Lever
    }

    async fn scrape(&self, client: &Client, org: &Organization) -> Vec<Posting> {
        log::info!("Starting Lever scrape of {}...", org.name);
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
            "id": "uuid-1",
            "text": "Customer Engineer",
            "categories": {
                "location": "Chicago, IL",
                "commitment": "Full-time",
                "team": "Deployments"
            },
            // 2021-01-01T00:00:00Z
            "createdAt": 1_609_459_200_000_i64
        });
        let posting = LeverScraper::normalize(&raw, &org());

        assert_eq!(posting.role_name, "Customer Engineer");
        assert_eq!(posting.location, "Chicago, IL");
        assert_eq!(posting.job_link, "https://jobs.lever.co/testcorp/uuid-1");
        assert_eq!(posting.employment_type, "Full-time");
        assert_eq!(posting.team, "Deployments");
        assert_eq!(posting.published_date, "2021-01-01");
        assert_eq!(posting.source, JobSource::Lever);
    }

    #[test]
    fn defaults_for_sparse_payload() {
        let raw = json!({"id": "uuid-2", "text": "Engineer"});
        let posting = LeverScraper::normalize(&raw, &org());
        assert_eq!(posting.employment_type, "FullTime");
        assert_eq!(posting.location, "");
        assert_eq!(posting.published_date, "");
    }
}
