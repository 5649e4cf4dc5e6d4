//! Local skip-cache for the record sync service.
//!
//! Remembers which postings were already synced so repeat runs skip the
//! existence check entirely. Stored as a small JSON file next to the data
//! directory; a missing or corrupt file simply starts the cache empty.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    synced_job_ids: Vec<String>,

    #[serde(default)]
    last_sync: Option<DateTime<Utc>>,

    #[serde(default)]
    total_synced: usize,
}

/// Set of already-synced posting keys with a last-sync timestamp.
#[derive(Debug)]
pub struct SkipCache {
    path: PathBuf,
    ids: HashSet<String>,
    last_sync: Option<DateTime<Utc>>,
}

impl SkipCache {
    /// Load the cache, tolerating a missing or unreadable file.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<CacheFile>(&contents).unwrap_or_else(|e| {
                log::warn!("Failed to parse sync cache {}: {e}", path.display());
                CacheFile::default()
            }),
            Err(_) => CacheFile::default(),
        };

        Self {
            path,
            ids: file.synced_job_ids.into_iter().collect(),
            last_sync: file.last_sync,
        }
    }

    /// Persist the cache, stamping the current time as the last sync.
    pub fn save(&mut self) -> Result<()> {
        self.last_sync = Some(Utc::now());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = CacheFile {
            synced_job_ids: self.ids.iter().cloned().collect(),
            last_sync: self.last_sync,
            total_synced: self.ids.len(),
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;

        log::debug!("Saved {} synced keys to {}", self.ids.len(), self.path.display());
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ids.contains(key)
    }

    pub fn insert(&mut self, key: String) {
        self.ids.insert(key);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Clear everything when the last sync is older than the threshold.
    ///
    /// Old postings cycle out of the boards anyway; the occasional re-check
    /// against the record store is cheaper than an unbounded cache.
    pub fn cleanup_if_stale(&mut self, max_age_days: i64) -> usize {
        let Some(last_sync) = self.last_sync else {
            return 0;
        };
        if last_sync >= Utc::now() - Duration::days(max_age_days) {
            return 0;
        }

        let removed = self.ids.len();
        self.ids.clear();
        log::info!(
            "Cleared {removed} cached keys older than {max_age_days} days"
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = SkipCache::load(tmp.path().join("nope.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        fs::write(&path, "not json").unwrap();
        let cache = SkipCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn round_trips_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/cache.json");

        let mut cache = SkipCache::load(&path);
        cache.insert("Ashby_a1".to_string());
        cache.insert("Lever_l1".to_string());
        cache.save().unwrap();

        let reloaded = SkipCache::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("Ashby_a1"));
        assert!(!reloaded.contains("Ashby_a2"));
    }

    #[test]
    fn fresh_cache_is_not_cleaned() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut cache = SkipCache::load(&path);
        cache.insert("key".to_string());
        cache.save().unwrap();

        let mut reloaded = SkipCache::load(&path);
        assert_eq!(reloaded.cleanup_if_stale(30), 0);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn stale_cache_is_cleared() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        let old = CacheFile {
            synced_job_ids: vec!["key".to_string()],
            last_sync: Some(Utc::now() - Duration::days(90)),
            total_synced: 1,
        };
        fs::write(&path, serde_json::to_vec(&old).unwrap()).unwrap();

        let mut cache = SkipCache::load(&path);
        assert_eq!(cache.cleanup_if_stale(30), 1);
        assert!(cache.is_empty());
    }
}
