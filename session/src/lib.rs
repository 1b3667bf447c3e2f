//! # Composable Rust Session
//!
//! Cookie-bound session storage for request handlers.
//!
//! ## Features
//!
//! - **Lazy**: a session is resolved and loaded on first access
//! - **Dotted keys**: `"group.field"` reads and writes nested values
//! - **Two backends**: a process-shared table with absolute expiry, or any
//!   TTL cache service (in-memory or Redis), picked from configuration
//! - **Whole-record writes**: every mutation persists the full session
//! - **Secure identifiers**: 256-bit random tokens
//!
//! ## Architecture
//!
//! ```text
//! Request ──Cookie──▶ CookieJar ──id──▶ SessionStore ──sess_{id}──▶ SessionBackend
//!                                                                    ├─ SharedTableBackend
//!                                                                    └─ CacheBackend<CacheService>
//!                                                                         ├─ MemoryCache
//!                                                                         └─ RedisCache
//! ```
//!
//! ## Example
//!
//! ```rust
//! use composable_rust_session::{CookieConfig, CookieJar, SessionConfig, SessionStore};
//! use composable_rust_session::stores::{ConfiguredBackend, MemoryCache, SharedTable};
//!
//! # async fn handle(cookie_header: &str) -> composable_rust_session::Result<Vec<String>> {
//! let config = SessionConfig::from_json(r#"{"name": "SID", "expire": 1440}"#)?;
//! let backend = ConfiguredBackend::select(&config, SharedTable::new(), MemoryCache::new());
//! let mut session = SessionStore::new(
//!     config,
//!     backend,
//!     CookieJar::from_header(cookie_header, CookieConfig::default()),
//! );
//!
//! session.set("user.name", "alice").await?;
//!
//! // Forward any new identifier cookie to the client
//! Ok(session.cookies().set_cookie_headers())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(test, allow(clippy::expect_used))]

// Public modules
pub mod config;
pub mod constants;
pub mod cookie_jar;
pub mod error;
pub mod id;
pub mod key;
pub mod providers;
pub mod store;
pub mod stores;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{CookieConfig, SessionConfig};
pub use cookie_jar::{CookieJar, SetCookie};
pub use error::{Result, SessionError};
pub use id::generate_session_id;
pub use key::{SessionData, SessionKey, SessionKeys};
pub use store::{SessionState, SessionStore};
