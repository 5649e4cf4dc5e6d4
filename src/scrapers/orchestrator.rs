//! Concurrent fetch orchestration.
//!
//! One orchestrator per platform runs its adapter over every configured
//! organization with bounded parallelism. Each organization runs as its own
//! spawned task; results are joined and flattened after all tasks settle. A
//! failing organization contributes an empty list and never cancels its
//! siblings, even when the adapter panics.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::error::Result;
use crate::location::LocationClassifier;
use crate::models::{Config, JobSource, Organization, Posting};

use super::{JobScraper, for_source};

/// Runs one platform's adapter over all of its organizations.
pub struct Orchestrator {
    scraper: Arc<dyn JobScraper>,
    max_concurrent: usize,
}

impl Orchestrator {
    pub fn new(scraper: Arc<dyn JobScraper>, max_concurrent: usize) -> Self {
        Self {
            scraper,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Scrape every organization with at most `max_concurrent` in flight.
    pub async fn scrape_all(
        &self,
        client: &reqwest::Client,
        organizations: &[Organization],
    ) -> Vec<Posting> {
        let source = self.scraper.source();
        if organizations.is_empty() {
            log::warn!("No organizations configured for {source}");
            return Vec::new();
        }

        log::info!(
            "Starting {} scrape of {} organizations (max {} concurrent)",
            source,
            organizations.len(),
            self.max_concurrent
        );
        let start = Instant::now();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let tasks: Vec<_> = organizations
            .iter()
            .map(|org| {
                let semaphore = Arc::clone(&semaphore);
                let scraper = Arc::clone(&self.scraper);
                let client = client.clone();
                let org = org.clone();
                // Spawned so a panicking adapter surfaces as a JoinError for
                // its own organization instead of unwinding through the batch.
                tokio::spawn(async move {
                    // The semaphore is never closed; a failed acquire still
                    // must not take down the batch.
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => return Vec::new(),
                    };
                    scraper.scrape(&client, &org).await
                })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;
        let postings: Vec<Posting> = results
            .into_iter()
            .flat_map(|result| match result {
                Ok(batch) => batch,
                Err(e) => {
                    log::error!("{source} scrape task failed: {e}");
                    Vec::new()
                }
            })
            .collect();

        log::info!(
            "{} scrape completed in {:.2}s ({} postings)",
            source,
            start.elapsed().as_secs_f64(),
            postings.len()
        );
        postings
    }
}

/// Run all three platform orchestrators concurrently over one shared client.
pub async fn run_all(
    config: &Config,
    client: &reqwest::Client,
    classifier: &Arc<LocationClassifier>,
) -> Result<(Vec<Posting>, Vec<Posting>, Vec<Posting>)> {
    let orchestrator_for = |source: JobSource| {
        Orchestrator::new(
            for_source(source, &config.filter.keywords, Arc::clone(classifier)),
            config.max_concurrent(source),
        )
    };

    let ashby = orchestrator_for(JobSource::Ashby);
    let greenhouse = orchestrator_for(JobSource::Greenhouse);
    let lever = orchestrator_for(JobSource::Lever);

    log::info!("Starting scrape of all platforms...");
    let start = Instant::now();

    let (ashby_postings, greenhouse_postings, lever_postings) = tokio::join!(
        ashby.scrape_all(client, config.organizations(JobSource::Ashby)),
        greenhouse.scrape_all(client, config.organizations(JobSource::Greenhouse)),
        lever.scrape_all(client, config.organizations(JobSource::Lever)),
    );

    log::info!(
        "All scraping completed in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    log::info!(
        "Scraping results: {} Ashby, {} Greenhouse, {} Lever postings",
        ashby_postings.len(),
        greenhouse_postings.len(),
        lever_postings.len()
    );

    Ok((ashby_postings, greenhouse_postings, lever_postings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    /// Mock adapter that tracks how many calls run at once.
    struct CountingScraper {
        in_flight: AtomicUsize,
        high_water: AtomicUsize,
        fail_for: Option<String>,
        panic_for: Option<String>,
    }

    impl CountingScraper {
        fn new(fail_for: Option<&str>) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                high_water: AtomicUsize::new(0),
                fail_for: fail_for.map(String::from),
                panic_for: None,
            }
        }

        fn panicking_for(org: &str) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                high_water: AtomicUsize::new(0),
                fail_for: None,
                panic_for: Some(org.to_string()),
            }
        }
    }

    #[async_trait]
    impl JobScraper for CountingScraper {
        fn source(&self) -> JobSource {
            JobSource::Lever
        }

        async fn scrape(&self, _client: &reqwest::Client, org: &Organization) -> Vec<Posting> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.high_water.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_for.as_deref() == Some(org.name.as_str()) {
                panic!("adapter blew up for {}", org.name);
            }
            if self.fail_for.as_deref() == Some(org.name.as_str()) {
                // Adapter-level failure surfaces as an empty list.
                return Vec::new();
            }
            vec![sample(&org.name)]
        }
    }

    fn sample(company: &str) -> Posting {
        Posting {
            role_name: "Engineer".to_string(),
            company_name: company.to_string(),
            location: "Remote".to_string(),
            job_link: format!("https://example.com/{company}"),
            employment_type: "FullTime".to_string(),
            team: String::new(),
            published_date: String::new(),
            compensation: "Not disclosed".to_string(),
            source: JobSource::Lever,
            job_id: company.to_string(),
        }
    }

    fn organizations(count: usize) -> Vec<Organization> {
        (0..count)
            .map(|i| Organization {
                name: format!("Org{i}"),
                slug: format!("org{i}"),
                url: String::new(),
                is_portfolio: false,
            })
            .collect()
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_limit() {
        let scraper = Arc::new(CountingScraper::new(None));
        let orchestrator = Orchestrator::new(Arc::clone(&scraper) as Arc<dyn JobScraper>, 5);
        let client = reqwest::Client::new();

        let postings = orchestrator.scrape_all(&client, &organizations(20)).await;

        assert_eq!(postings.len(), 20);
        assert!(scraper.high_water.load(Ordering::SeqCst) <= 5);
        assert!(scraper.high_water.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn one_failing_org_does_not_lose_the_rest() {
        let scraper = Arc::new(CountingScraper::new(Some("Org7")));
        let orchestrator = Orchestrator::new(scraper, 5);
        let client = reqwest::Client::new();

        let postings = orchestrator.scrape_all(&client, &organizations(20)).await;

        assert_eq!(postings.len(), 19);
        assert!(!postings.iter().any(|p| p.company_name == "Org7"));
    }

    #[tokio::test]
    async fn one_panicking_org_does_not_lose_the_rest() {
        let scraper = Arc::new(CountingScraper::panicking_for("Org7"));
        let orchestrator = Orchestrator::new(scraper, 5);
        let client = reqwest::Client::new();

        let postings = orchestrator.scrape_all(&client, &organizations(20)).await;

        assert_eq!(postings.len(), 19);
        assert!(!postings.iter().any(|p| p.company_name == "Org7"));
    }

    #[tokio::test]
    async fn empty_org_list_returns_immediately() {
        let scraper = Arc::new(CountingScraper::new(None));
        let orchestrator = Orchestrator::new(scraper, 5);
        let client = reqwest::Client::new();

        let postings = orchestrator.scrape_all(&client, &[]).await;
        assert!(postings.is_empty());
    }
}
