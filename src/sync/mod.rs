//! Sync of final postings to an external record store.
//!
//! The store is a trait so the sync loop can be tested without a network.
//! A local skip-cache avoids re-checking postings that were synced on a
//! previous run; per-posting failures are counted and logged, never fatal.

mod cache;
mod notion;

pub use cache::SkipCache;
pub use notion::NotionStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Posting, SyncConfig};

/// External store that holds one record per posting.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a record with this job link already exists.
    async fn exists(&self, job_link: &str) -> Result<bool>;

    /// Create a record for the posting.
    async fn create(&self, posting: &Posting) -> Result<()>;
}

/// Counts from one sync pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub total: usize,
    pub new: usize,
    pub existing: usize,
    pub cached_skip: usize,
    pub errors: usize,
}

impl SyncStats {
    pub fn log(&self) {
        log::info!("Sync statistics:");
        log::info!("  Total postings: {}", self.total);
        log::info!("  New records created: {}", self.new);
        log::info!("  Already existed: {}", self.existing);
        log::info!("  Skipped via cache: {}", self.cached_skip);
        log::info!("  Errors: {}", self.errors);
    }
}

/// Sync postings into the store, consulting and updating the skip-cache.
///
/// Postings are processed sequentially; the store's rate limits are tighter
/// than anything a batch here would gain from parallelism.
pub async fn sync_postings(
    store: &dyn RecordStore,
    cache: &mut SkipCache,
    postings: &[Posting],
) -> SyncStats {
    let mut stats = SyncStats {
        total: postings.len(),
        ..SyncStats::default()
    };

    for posting in postings {
        let key = posting.sync_key();
        if cache.contains(&key) {
            stats.cached_skip += 1;
            continue;
        }

        if posting.job_link.trim().is_empty() {
            log::warn!(
                "Skipping {} at {}: no job link to key the record on",
                posting.role_name,
                posting.company_name
            );
            stats.errors += 1;
            continue;
        }

        match store.exists(&posting.job_link).await {
            Ok(true) => {
                stats.existing += 1;
                cache.insert(key);
            }
            Ok(false) => match store.create(posting).await {
                Ok(()) => {
                    log::info!(
                        "Synced {} at {}",
                        posting.role_name,
                        posting.company_name
                    );
                    stats.new += 1;
                    cache.insert(key);
                }
                Err(e) => {
                    log::error!(
                        "Failed to create record for {} at {}: {e}",
                        posting.role_name,
                        posting.company_name
                    );
                    stats.errors += 1;
                }
            },
            Err(e) => {
                log::error!(
                    "Failed existence check for {} at {}: {e}",
                    posting.role_name,
                    posting.company_name
                );
                stats.errors += 1;
            }
        }
    }

    stats
}

/// Full sync pass against the configured Notion database.
pub async fn run_sync(config: &SyncConfig, postings: &[Posting]) -> Result<SyncStats> {
    let store = NotionStore::from_config(config)?;

    let mut cache = SkipCache::load(&config.cache_path);
    cache.cleanup_if_stale(config.cache_max_age_days);
    log::info!("Loaded sync cache with {} entries", cache.len());

    let stats = sync_postings(&store, &mut cache, postings).await;
    cache.save()?;

    stats.log();
    Ok(stats)
}
