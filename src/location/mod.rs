// src/location/mod.rs

//! Layered US location classification.
//!
//! Decision order: cached verdict, pattern tables, geocoding fallback,
//! conservative default. Empty input defaults to inclusion (no information),
//! while an unresolvable non-empty location is excluded — precision over
//! recall when there is no signal.

mod geocode;
mod patterns;

use std::collections::HashMap;
use std::sync::Mutex;

pub use geocode::Geocoder;

use crate::models::GeocoderConfig;

/// Cache counters for the end-of-run summary log.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub us: usize,
    pub non_us: usize,
}

/// Classifies free-text location strings as US or non-US.
///
/// Constructed once per run and shared behind an `Arc`; every resolved
/// verdict lands in the in-memory cache, so repeated locations cost one
/// lookup at most.
pub struct LocationClassifier {
    cache: Mutex<HashMap<String, bool>>,
    geocoder: Option<Geocoder>,
}

impl LocationClassifier {
    pub fn new(config: &GeocoderConfig, user_agent: &str) -> Self {
        let geocoder = config
            .enabled
            .then(|| Geocoder::new(config, user_agent));
        Self {
            cache: Mutex::new(HashMap::new()),
            geocoder,
        }
    }

    /// Classifier without the geocoding fallback.
    pub fn without_geocoder() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            geocoder: None,
        }
    }

    /// Full classification with the geocoding fallback.
    pub async fn classify(&self, location: &str) -> bool {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return true;
        }
        let key = trimmed.to_lowercase();

        if let Some(verdict) = self.cached(&key) {
            return verdict;
        }
        if let Some(verdict) = patterns::pattern_match(&key) {
            self.insert(key, verdict);
            return verdict;
        }

        let verdict = match &self.geocoder {
            Some(geocoder) => geocoder.lookup(trimmed).await.unwrap_or(false),
            None => false,
        };
        if !verdict {
            log::debug!("Unresolved location '{trimmed}', excluding");
        }
        self.insert(key, verdict);
        verdict
    }

    /// Pattern-only classification for callers that cannot suspend.
    ///
    /// Skips geocoding and applies the conservative default directly.
    pub fn classify_sync(&self, location: &str) -> bool {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return true;
        }
        let key = trimmed.to_lowercase();

        if let Some(verdict) = self.cached(&key) {
            return verdict;
        }
        let verdict = patterns::pattern_match(&key).unwrap_or(false);
        self.insert(key, verdict);
        verdict
    }

    /// Counters over all cached verdicts.
    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock().expect("classifier cache poisoned");
        let us = cache.values().filter(|v| **v).count();
        CacheStats {
            total: cache.len(),
            us,
            non_us: cache.len() - us,
        }
    }

    fn cached(&self, key: &str) -> Option<bool> {
        self.cache
            .lock()
            .expect("classifier cache poisoned")
            .get(key)
            .copied()
    }

    fn insert(&self, key: String, verdict: bool) {
        self.cache
            .lock()
            .expect("classifier cache poisoned")
            .insert(key, verdict);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_location_is_included() {
        let classifier = LocationClassifier::without_geocoder();
        assert!(classifier.classify("").await);
        assert!(classifier.classify("   ").await);
    }

    #[tokio::test]
    async fn pattern_verdicts() {
        let classifier = LocationClassifier::without_geocoder();
        assert!(classifier.classify("San Francisco, CA").await);
        assert!(classifier.classify("Remote").await);
        assert!(!classifier.classify("London, UK").await);
        assert!(!classifier.classify("Remote - Canada").await);
    }

    #[tokio::test]
    async fn unknown_location_is_excluded_without_geocoder() {
        let classifier = LocationClassifier::without_geocoder();
        assert!(!classifier.classify("Zzqxvtopolis").await);
    }

    #[test]
    fn sync_path_matches_async_on_patterns() {
        let classifier = LocationClassifier::without_geocoder();
        assert!(classifier.classify_sync("Austin, TX"));
        assert!(!classifier.classify_sync("Toronto, Canada"));
        assert!(!classifier.classify_sync("Zzqxvtopolis"));
        assert!(classifier.classify_sync(""));
    }

    #[tokio::test]
    async fn verdicts_are_cached() {
        let classifier = LocationClassifier::without_geocoder();
        classifier.classify("Seattle, WA").await;
        classifier.classify("Sydney, Australia").await;
        classifier.classify("Seattle, WA").await;

        let stats = classifier.cache_stats();
        assert_eq!(
            stats,
            CacheStats {
                total: 2,
                us: 1,
                non_us: 1
            }
        );
    }

    #[test]
    fn cache_is_keyed_case_insensitively() {
        let classifier = LocationClassifier::without_geocoder();
        assert!(classifier.classify_sync("BOSTON, ma"));
        assert!(classifier.classify_sync("Boston, MA"));
        assert_eq!(classifier.cache_stats().total, 1);
    }
}
