//! Session backend trait.

use crate::error::Result;
use crate::key::SessionData;
use std::future::Future;

/// Persistence for whole session records.
///
/// Keys are always `sess_{session_id}` (see
/// [`session_key`](crate::constants::session_key)). Records are written in
/// full on every mutation; there are no partial updates.
///
/// # Implementation Notes
///
/// - A missing or expired record is `Ok(None)`, never an error
/// - Errors are reserved for the backend itself failing
/// - Each call must be atomic for its key
pub trait SessionBackend: Send + Sync {
    /// Load a session record.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<SessionData>>> + Send;

    /// Replace a session record.
    ///
    /// # Arguments
    ///
    /// - `key`: Record key
    /// - `data`: Entire session mapping
    /// - `ttl_seconds`: Lifetime, `0` for no expiry
    ///
    /// # Errors
    ///
    /// Returns error if the mapping cannot be encoded or the write fails.
    fn save(
        &self,
        key: &str,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a session record. Removing a missing record succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
