//! In-memory cache implementation with LRU eviction.
//!
//! Values carry a sliding and an absolute deadline. Reads refresh the sliding
//! deadline; expired values are dropped lazily when next touched.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use logbook_core::cache::{Cache, CachePolicy, Result};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    sliding: Option<Duration>,
    last_access: Instant,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, policy: CachePolicy, now: Instant) -> Self {
        Self {
            value,
            sliding: policy.sliding,
            last_access: now,
            expires_at: policy.absolute.map(|d| now + d),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        let idle_expired = self
            .sliding
            .is_some_and(|window| now.duration_since(self.last_access) > window);
        let absolute_expired = self.expires_at.is_some_and(|exp| now > exp);
        idle_expired || absolute_expired
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Uses LRU eviction to limit memory usage when max_entries is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of values currently held, expired ones included.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;
        let now = Instant::now();

        let expired = match store.get_mut(key) {
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => {
                entry.last_access = now;
                return Ok(Some(entry.value.clone()));
            }
            None => false,
        };

        if expired {
            store.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], policy: CachePolicy) -> Result<()> {
        let mut store = self.store.write().await;
        let entry = CacheEntry::new(value.to_vec(), policy, Instant::now());
        store.put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }
}
