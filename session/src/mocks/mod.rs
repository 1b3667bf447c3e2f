//! Mock provider implementations for testing.
//!
//! In-memory stand-ins for the collaborator traits, for use in unit and
//! integration tests.

pub mod backend;
pub mod clock;

pub use backend::{FailingBackend, RecordingBackend};
pub use clock::MockClock;
