use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Expiration rules for a cached value.
///
/// A value expires once it has gone unread for `sliding`, or once `absolute`
/// has passed since it was stored, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub sliding: Option<Duration>,
    pub absolute: Option<Duration>,
}

impl CachePolicy {
    pub fn new(sliding: Duration, absolute: Duration) -> Self {
        Self {
            sliding: Some(sliding),
            absolute: Some(absolute),
        }
    }
}

impl Default for CachePolicy {
    /// Two minutes sliding, ten minutes absolute.
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(600))
    }
}

/// Trait for basic cache operations.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache under the given expiration policy.
    async fn set(&self, key: &str, value: &[u8], policy: CachePolicy) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;
}
