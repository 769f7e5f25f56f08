//! Search page cache
//!
//! Keeps the raw records of recently served search pages so that a download
//! request can find a book without searching again. Entries are keyed by page
//! number only, bounded by an LRU capacity and optionally expired by age.
//!
//! # Thread Safety
//!
//! The LRU is wrapped in a `tokio::sync::RwLock`; lookups take the read lock
//! for the whole scan.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::zlib::Record;

struct CachedPage {
    records: Vec<Record>,
    stored_at: Instant,
}

/// Page number to raw search records
#[derive(Clone)]
pub struct PageCache {
    pages: Arc<RwLock<LruCache<u32, CachedPage>>>,
    ttl: Option<Duration>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(64, None)
    }
}

impl PageCache {
    /// Create a cache holding at most `max_pages` pages
    pub fn new(max_pages: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(max_pages).unwrap_or(NonZeroUsize::MIN);
        Self {
            pages: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    /// Create a cache from configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_pages, config.ttl())
    }

    fn is_live(&self, page: &CachedPage, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.duration_since(page.stored_at) < ttl,
            None => true,
        }
    }

    /// Store the records of a page, replacing any earlier entry for it
    pub async fn put(&self, page: u32, records: Vec<Record>) {
        let now = Instant::now();
        let mut pages = self.pages.write().await;

        if self.ttl.is_some() {
            let expired: Vec<u32> = pages
                .iter()
                .filter(|(_, cached)| !self.is_live(cached, now))
                .map(|(stale, _)| *stale)
                .collect();
            for stale in expired {
                pages.pop(&stale);
            }
        }

        if let Some((evicted, _)) = pages.push(
            page,
            CachedPage {
                records,
                stored_at: now,
            },
        ) {
            if evicted != page {
                tracing::debug!("Evicted search page {} from cache", evicted);
            }
        }
    }

    /// Find a record by id across all cached pages
    ///
    /// Pages are scanned most recently stored first; the first match wins.
    pub async fn find_by_id(&self, id: &str) -> Option<Record> {
        let now = Instant::now();
        let pages = self.pages.read().await;

        pages
            .iter()
            .filter(|(_, cached)| self.is_live(cached, now))
            .flat_map(|(_, cached)| cached.records.iter())
            .find(|record| record.id().as_deref() == Some(id))
            .cloned()
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let pages = self.pages.read().await;
        CacheStats {
            pages: pages.len(),
            records: pages.iter().map(|(_, cached)| cached.records.len()).sum(),
            capacity: pages.cap().get(),
            ttl_secs: self.ttl.map(|ttl| ttl.as_secs()),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cached pages
    pub pages: usize,
    /// Number of records across all pages
    pub records: usize,
    /// Maximum number of pages
    pub capacity: usize,
    /// Entry lifetime, `None` when entries never expire
    pub ttl_secs: Option<u64>,
}
