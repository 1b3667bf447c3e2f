//! Collaborator traits.
//!
//! The session store never talks to a concrete transport or storage service.
//! Each collaborator is a trait so production and test implementations can be
//! swapped at construction time:
//!
//! - [`SessionBackend`] persists whole session records
//! - [`CacheService`] is a generic TTL cache the cache backend writes through
//! - [`CookieTransport`] carries the session identifier
//! - [`Clock`] supplies "now" for absolute expiry

pub mod backend;
pub mod cache;
pub mod clock;
pub mod cookie;

pub use backend::SessionBackend;
pub use cache::CacheService;
pub use clock::{Clock, SystemClock};
pub use cookie::{CookieOptions, CookieTransport};
