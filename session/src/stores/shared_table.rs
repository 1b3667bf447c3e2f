//! Shared-table session backend.
//!
//! The table is a process-wide map shared by every store (clone the
//! [`SharedTable`] handle into each worker). Each row holds the JSON-encoded
//! session plus an absolute expiry timestamp in Unix seconds; `0` never
//! expires. Liveness is checked on read and an expired row is deleted when
//! it is read.

use crate::error::{Result, SessionError};
use crate::key::SessionData;
use crate::providers::{Clock, SessionBackend, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A row of the shared table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// JSON-encoded session mapping.
    pub data: String,

    /// Absolute expiry in Unix seconds. `0` never expires.
    pub expire: i64,
}

impl TableEntry {
    /// Returns `true` if the row is still valid at `now` (Unix seconds).
    ///
    /// # Examples
    ///
    /// ```
    /// use composable_rust_session::stores::TableEntry;
    ///
    /// let row = TableEntry { data: "{}".into(), expire: 100 };
    /// assert!(row.is_live_at(100));
    /// assert!(!row.is_live_at(101));
    ///
    /// let forever = TableEntry { data: "{}".into(), expire: 0 };
    /// assert!(forever.is_live_at(i64::MAX));
    /// ```
    #[must_use]
    pub const fn is_live_at(&self, now: i64) -> bool {
        self.expire == 0 || now <= self.expire
    }
}

/// Process-shared table with atomic per-key operations.
///
/// Cloning shares the underlying rows.
#[derive(Debug, Clone, Default)]
pub struct SharedTable {
    rows: Arc<Mutex<HashMap<String, TableEntry>>>,
}

impl SharedTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a row, live or not.
    ///
    /// # Errors
    ///
    /// Returns error if the table lock is poisoned.
    pub fn get(&self, key: &str) -> Result<Option<TableEntry>> {
        Ok(self.lock()?.get(key).cloned())
    }

    /// Insert or replace a row.
    ///
    /// # Errors
    ///
    /// Returns error if the table lock is poisoned.
    pub fn set(&self, key: &str, entry: TableEntry) -> Result<()> {
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    /// Delete a row.
    ///
    /// # Errors
    ///
    /// Returns error if the table lock is poisoned.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    /// Delete a row only if it has expired at `now` (Unix seconds).
    ///
    /// Returns `true` if a row was deleted. A row rewritten by another worker
    /// since it was read is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the table lock is poisoned.
    pub fn delete_expired(&self, key: &str, now: i64) -> Result<bool> {
        let mut rows = self.lock()?;
        if rows.get(key).is_some_and(|entry| !entry.is_live_at(now)) {
            rows.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    /// Number of rows, expired ones included.
    ///
    /// # Errors
    ///
    /// Returns error if the table lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if the table has no rows.
    ///
    /// # Errors
    ///
    /// Returns error if the table lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, TableEntry>>> {
        self.rows
            .lock()
            .map_err(|_| SessionError::Backend("Shared table lock poisoned".to_string()))
    }
}

/// Session backend over a [`SharedTable`].
#[derive(Clone)]
pub struct SharedTableBackend {
    table: SharedTable,
    clock: Arc<dyn Clock>,
}

impl SharedTableBackend {
    /// Create a backend using the system clock.
    #[must_use]
    pub fn new(table: SharedTable) -> Self {
        Self::with_clock(table, Arc::new(SystemClock))
    }

    /// Create a backend with an explicit clock.
    #[must_use]
    pub fn with_clock(table: SharedTable, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }

    /// The underlying table.
    #[must_use]
    pub const fn table(&self) -> &SharedTable {
        &self.table
    }

    fn expiry_for(&self, ttl_seconds: u64) -> i64 {
        if ttl_seconds == 0 {
            return 0;
        }
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        self.clock.now().timestamp().saturating_add(ttl)
    }
}

impl fmt::Debug for SharedTableBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTableBackend")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl SessionBackend for SharedTableBackend {
    async fn load(&self, key: &str) -> Result<Option<SessionData>> {
        let Some(entry) = self.table.get(key)? else {
            return Ok(None);
        };

        let now = self.clock.now().timestamp();
        if !entry.is_live_at(now) {
            self.table.delete_expired(key, now)?;
            tracing::debug!(
                session_key = %key,
                expire = entry.expire,
                now = now,
                "Shared table row expired"
            );
            return Ok(None);
        }

        Ok(super::decode(key, entry.data.as_bytes()))
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> Result<()> {
        let entry = TableEntry {
            data: super::encode(data)?,
            expire: self.expiry_for(ttl_seconds),
        };

        tracing::debug!(
            session_key = %key,
            bytes = entry.data.len(),
            expire = entry.expire,
            "Saved session to shared table"
        );

        self.table.set(key, entry)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.table.delete(key)?;
        tracing::debug!(session_key = %key, "Removed session from shared table");
        Ok(())
    }
}
