//! Redis-based cache service.
//!
//! Values are stored under the key the caller passes (`sess_{id}` for session
//! records) with Redis handling expiry:
//!
//! - **Write**: `SET key value EX ttl`, or plain `SET` for `ttl = 0`
//! - **Read**: `GET key`
//! - **Delete**: `DEL key`
//!
//! # Example
//!
//! ```no_run
//! use composable_rust_session::stores::{CacheBackend, RedisCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = RedisCache::new("redis://127.0.0.1:6379").await?;
//! let backend = CacheBackend::new(cache);
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SessionError};
use crate::providers::CacheService;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// `Redis` cache service.
///
/// Connection pooling via `ConnectionManager`; clones share the connection.
#[derive(Clone)]
pub struct RedisCache {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisCache {
    /// Create a new `Redis` cache.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns error if connection to `Redis` fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            SessionError::Backend(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            SessionError::Backend(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    /// Create a cache from an existing connection manager.
    #[must_use]
    pub const fn from_connection_manager(conn_manager: ConnectionManager) -> Self {
        Self { conn_manager }
    }
}

impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn_manager.clone();

        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| SessionError::Backend(format!("Failed to get {key} from Redis: {e}")))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let result: redis::RedisResult<()> = if ttl_seconds == 0 {
            conn.set(key, value).await
        } else {
            conn.set_ex(key, value, ttl_seconds).await
        };

        result.map_err(|e| SessionError::Backend(format!("Failed to set {key} in Redis: {e}")))?;

        tracing::debug!(key = %key, ttl_seconds = ttl_seconds, "Stored value in Redis");

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn
            .del(key)
            .await
            .map_err(|e| SessionError::Backend(format!("Failed to delete {key} from Redis: {e}")))?;

        Ok(())
    }
}
