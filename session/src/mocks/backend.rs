//! Mock session backends for testing.

use crate::error::{Result, SessionError};
use crate::key::SessionData;
use crate::providers::SessionBackend;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend whose every call fails, for error propagation tests.
#[derive(Debug, Clone, Default)]
pub struct FailingBackend;

impl SessionBackend for FailingBackend {
    async fn load(&self, _key: &str) -> Result<Option<SessionData>> {
        Err(SessionError::Backend("backend unavailable".to_string()))
    }

    async fn save(&self, _key: &str, _data: &SessionData, _ttl_seconds: u64) -> Result<()> {
        Err(SessionError::Backend("backend unavailable".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(SessionError::Backend("backend unavailable".to_string()))
    }
}

/// Wraps a backend and counts the calls made through it.
///
/// Clones share the counters.
#[derive(Debug, Clone)]
pub struct RecordingBackend<B> {
    inner: B,
    loads: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
    removes: Arc<AtomicUsize>,
}

impl<B> RecordingBackend<B> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            loads: Arc::new(AtomicUsize::new(0)),
            saves: Arc::new(AtomicUsize::new(0)),
            removes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `load` calls.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `save` calls.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of `remove` calls.
    #[must_use]
    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: SessionBackend> SessionBackend for RecordingBackend<B> {
    async fn load(&self, key: &str) -> Result<Option<SessionData>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(key, data, ttl_seconds).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
}
