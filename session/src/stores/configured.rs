//! Backend chosen from configuration.

use super::{CacheBackend, SharedTable, SharedTableBackend};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::key::SessionData;
use crate::providers::{CacheService, SessionBackend};

/// One of the two session backends, picked once at construction.
///
/// # Example
///
/// ```
/// use composable_rust_session::SessionConfig;
/// use composable_rust_session::stores::{ConfiguredBackend, MemoryCache, SharedTable};
///
/// let config = SessionConfig::default().with_shared_table(true);
/// let backend = ConfiguredBackend::select(&config, SharedTable::new(), MemoryCache::new());
/// assert_eq!(backend.kind(), "shared_table");
/// ```
#[derive(Debug, Clone)]
pub enum ConfiguredBackend<S> {
    /// Shared-table persistence.
    SharedTable(SharedTableBackend),

    /// Cache-service persistence.
    Cache(CacheBackend<S>),
}

impl<S: CacheService> ConfiguredBackend<S> {
    /// Select the backend named by `config.use_shared_table`.
    #[must_use]
    pub fn select(config: &SessionConfig, table: SharedTable, cache: S) -> Self {
        let backend = if config.use_shared_table {
            Self::SharedTable(SharedTableBackend::new(table))
        } else {
            Self::Cache(CacheBackend::new(cache))
        };

        tracing::debug!(backend = backend.kind(), "Selected session backend");

        backend
    }

    /// Backend name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SharedTable(_) => "shared_table",
            Self::Cache(_) => "cache",
        }
    }
}

impl<S: CacheService> SessionBackend for ConfiguredBackend<S> {
    async fn load(&self, key: &str) -> Result<Option<SessionData>> {
        match self {
            Self::SharedTable(backend) => backend.load(key).await,
            Self::Cache(backend) => backend.load(key).await,
        }
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> Result<()> {
        match self {
            Self::SharedTable(backend) => backend.save(key, data, ttl_seconds).await,
            Self::Cache(backend) => backend.save(key, data, ttl_seconds).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match self {
            Self::SharedTable(backend) => backend.remove(key).await,
            Self::Cache(backend) => backend.remove(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryCache;

    #[test]
    fn test_select_follows_config() {
        let cache_config = SessionConfig::default();
        let backend = ConfiguredBackend::select(&cache_config, SharedTable::new(), MemoryCache::new());
        assert_eq!(backend.kind(), "cache");

        let table_config = SessionConfig::default().with_shared_table(true);
        let backend = ConfiguredBackend::select(&table_config, SharedTable::new(), MemoryCache::new());
        assert!(matches!(backend, ConfiguredBackend::SharedTable(_)));
    }

    #[tokio::test]
    async fn test_writes_land_in_selected_backend() {
        let table = SharedTable::new();
        let cache = MemoryCache::new();
        let config = SessionConfig::default().with_shared_table(true);
        let backend = ConfiguredBackend::select(&config, table.clone(), cache.clone());

        backend.save("sess_a", &SessionData::new(), 0).await.expect("save");

        assert_eq!(table.len().expect("len"), 1);
        assert!(cache.is_empty().expect("is_empty"));
    }
}
