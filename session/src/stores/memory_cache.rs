//! In-process cache service.

use crate::error::{Result, SessionError};
use crate::providers::{CacheService, Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
}

/// In-memory [`CacheService`] with relative TTL.
///
/// Expired entries are dropped when read; there is no background sweep.
/// Cloning shares the underlying entries.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create an empty cache using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache with an explicit clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    ///
    /// # Errors
    ///
    /// Returns error if the cache lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns error if the cache lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| SessionError::Backend("Memory cache lock poisoned".to_string()))
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;

        let expired = match entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.expires_at.is_some_and(|expires_at| now >= expires_at),
        };

        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()> {
        let expires_at = if ttl_seconds == 0 {
            None
        } else {
            let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
            Duration::try_seconds(ttl).and_then(|ttl| self.clock.now().checked_add_signed(ttl))
        };

        self.lock()?
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StaticClock(DateTime<Utc>);

    impl Clock for StaticClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(timestamp: i64) -> Arc<dyn Clock> {
        Arc::new(StaticClock(Utc.timestamp_opt(timestamp, 0).single().unwrap_or_default()))
    }

    /// Cache sharing `cache`'s entries but reading time from another clock.
    fn observed_at(cache: &MemoryCache, timestamp: i64) -> MemoryCache {
        MemoryCache {
            entries: Arc::clone(&cache.entries),
            clock: at(timestamp),
        }
    }

    #[tokio::test]
    async fn test_ttl_expiry_is_lazy() {
        let cache = MemoryCache::with_clock(at(1_000));
        cache.set("k", b"v".to_vec(), 30).await.expect("set");

        let before = observed_at(&cache, 1_029);
        assert_eq!(before.get("k").await.expect("get"), Some(b"v".to_vec()));
        assert_eq!(cache.len().expect("len"), 1);

        let after = observed_at(&cache, 1_030);
        assert_eq!(after.get("k").await.expect("get"), None);
        assert!(cache.is_empty().expect("is_empty"));
    }

    #[tokio::test]
    async fn test_zero_ttl_keeps_entry() {
        let cache = MemoryCache::with_clock(at(1_000));
        cache.set("k", b"v".to_vec(), 0).await.expect("set");

        let much_later = observed_at(&cache, 1_000_000_000);
        assert_eq!(much_later.get("k").await.expect("get"), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_missing_key_succeeds() {
        let cache = MemoryCache::new();
        cache.delete("missing").await.expect("delete");
        assert!(cache.is_empty().expect("is_empty"));
    }
}
