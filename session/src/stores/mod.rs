//! Storage implementations for session records.
//!
//! - **Shared table** - process-shared table with absolute expiry per row
//! - **Cache backend** - writes through any [`CacheService`](crate::providers::CacheService)
//! - **Memory cache** - in-process cache service with lazy TTL expiry
//! - **Redis cache** - cache service over Redis `SET EX` / `GET` / `DEL`
//! - **Configured backend** - picks one of the above from configuration
//!
//! Records are stored as JSON objects.

pub mod cache_backend;
pub mod cache_redis;
pub mod configured;
pub mod memory_cache;
pub mod shared_table;

// Re-exports
pub use cache_backend::CacheBackend;
pub use cache_redis::RedisCache;
pub use configured::ConfiguredBackend;
pub use memory_cache::MemoryCache;
pub use shared_table::{SharedTable, SharedTableBackend, TableEntry};

use crate::error::{Result, SessionError};
use crate::key::SessionData;

/// Encode a session mapping for storage.
pub(crate) fn encode(data: &SessionData) -> Result<String> {
    serde_json::to_string(data).map_err(|e| SessionError::Serialization(e.to_string()))
}

/// Decode a stored record.
///
/// Records that are not JSON objects are treated as absent.
pub(crate) fn decode(key: &str, bytes: &[u8]) -> Option<SessionData> {
    match serde_json::from_slice(bytes) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(
                session_key = %key,
                error = %e,
                "Discarding undecodable session record"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(decode("sess_a", b"[1, 2, 3]").is_none());
        assert!(decode("sess_a", b"not json").is_none());
        assert_eq!(
            decode("sess_a", br#"{"user": "alice"}"#).and_then(|d| d.get("user").cloned()),
            Some(json!("alice"))
        );
    }
}
