//! Geocoding fallback for locations no pattern recognizes.
//!
//! Talks to a Nominatim-style search endpoint and reads the country code of
//! the first result. All calls share a single rate limiter: the public
//! endpoint allows roughly one request per second, so callers cooperatively
//! wait out the configured spacing instead of blocking a worker thread.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::GeocoderConfig;

/// Enforces a minimum spacing between calls, shared across all tasks.
struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the spacing since the previous call has elapsed.
    ///
    /// The lock is held across the sleep on purpose: concurrent callers queue
    /// up behind it, which is exactly the serialization the endpoint needs.
    async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

/// Rate-limited geocoding client.
pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
    limiter: RateLimiter,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build geocoder HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            limiter: RateLimiter::new(Duration::from_millis(config.min_interval_ms)),
        }
    }

    /// Resolve a location to a US verdict.
    ///
    /// Returns `None` when the endpoint fails, returns nothing, or the result
    /// carries no country code; the caller applies its conservative default.
    pub async fn lookup(&self, location: &str) -> Option<bool> {
        self.limiter.wait().await;

        match self.country_code(location).await {
            Ok(Some(code)) => {
                let is_us = code == "US";
                log::debug!("Geocoded '{location}' -> {code}");
                Some(is_us)
            }
            Ok(None) => None,
            Err(e) => {
                log::debug!("Geocoding failed for '{location}': {e}");
                None
            }
        }
    }

    async fn country_code(&self, location: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", location),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let results: Vec<serde_json::Value> = response.json().await?;
        Ok(results
            .first()
            .and_then(|r| r.get("address"))
            .and_then(|a| a.get("country_code"))
            .and_then(|c| c.as_str())
            .map(|c| c.to_uppercase()))
    }
}
