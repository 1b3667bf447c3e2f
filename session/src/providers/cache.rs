//! Cache service trait.

use crate::error::Result;
use std::future::Future;

/// Generic key/value cache with relative TTL.
///
/// The cache decides liveness itself: an expired entry reads as `None`.
pub trait CacheService: Send + Sync {
    /// Get a value.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be reached.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store a value for `ttl_seconds` (`0` keeps it until deleted).
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be reached.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be reached.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
