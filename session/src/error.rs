//! Error types for session operations.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures surfaced by the session store.
///
/// Missing keys and missing sessions are never errors: they resolve to
/// `None`, `false` or an empty mapping. Only collaborator failures end up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A backend read, write or delete failed.
    ///
    /// Distinct from "record not found", which backends report as `Ok(None)`.
    #[error("Session backend error: {0}")]
    Backend(String),

    /// A session mapping could not be encoded for persistence.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be parsed.
    #[error("Invalid session configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Returns `true` if the error came from the persistence backend.
    ///
    /// # Examples
    ///
    /// ```
    /// # use composable_rust_session::SessionError;
    /// assert!(SessionError::Backend("connection refused".into()).is_backend_failure());
    /// assert!(!SessionError::Config("bad json".into()).is_backend_failure());
    /// ```
    #[must_use]
    pub const fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
