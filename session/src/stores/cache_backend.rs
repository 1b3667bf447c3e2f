//! Session backend over a generic cache service.

use crate::error::Result;
use crate::key::SessionData;
use crate::providers::{CacheService, SessionBackend};

/// Persists sessions through a [`CacheService`].
///
/// Liveness is whatever the cache decides; this backend passes the session
/// lifetime through as the entry TTL.
#[derive(Debug, Clone)]
pub struct CacheBackend<S> {
    cache: S,
}

impl<S: CacheService> CacheBackend<S> {
    /// Wrap a cache service.
    #[must_use]
    pub const fn new(cache: S) -> Self {
        Self { cache }
    }

    /// The underlying cache service.
    #[must_use]
    pub const fn cache(&self) -> &S {
        &self.cache
    }
}

impl<S: CacheService> SessionBackend for CacheBackend<S> {
    async fn load(&self, key: &str) -> Result<Option<SessionData>> {
        let bytes = self.cache.get(key).await?;
        Ok(bytes.and_then(|bytes| super::decode(key, &bytes)))
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> Result<()> {
        let encoded = super::encode(data)?;

        tracing::debug!(
            session_key = %key,
            bytes = encoded.len(),
            ttl_seconds = ttl_seconds,
            "Saved session to cache"
        );

        self.cache.set(key, encoded.into_bytes(), ttl_seconds).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await?;
        tracing::debug!(session_key = %key, "Removed session from cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryCache;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip_through_cache() {
        let cache = MemoryCache::new();
        let backend = CacheBackend::new(cache.clone());

        let mut data = SessionData::new();
        data.insert("cart".to_string(), json!({ "items": 2 }));

        backend.save("sess_a", &data, 600).await.expect("save");
        assert_eq!(backend.load("sess_a").await.expect("load"), Some(data));

        backend.remove("sess_a").await.expect("remove");
        assert_eq!(cache.get("sess_a").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_foreign_cache_value_reads_as_absent() {
        let cache = MemoryCache::new();
        cache
            .set("sess_a", b"\"just a string\"".to_vec(), 0)
            .await
            .expect("set");

        let backend = CacheBackend::new(cache);
        assert_eq!(backend.load("sess_a").await.expect("load"), None);
    }
}
