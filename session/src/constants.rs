//! Session constants.

/// Cookie name used when configuration does not provide one.
pub const DEFAULT_SESSION_NAME: &str = "PHPSESSID";

/// Prefix of every backend record key.
///
/// Full key format: `sess_{session_id}`.
pub const SESSION_KEY_PREFIX: &str = "sess_";

/// Number of random bytes in a generated session identifier.
pub const SESSION_ID_BYTES: usize = 32;

/// Backend record key for a session identifier.
///
/// # Examples
///
/// ```
/// use composable_rust_session::constants::session_key;
///
/// assert_eq!(session_key("abc123"), "sess_abc123");
/// ```
#[must_use]
pub fn session_key(session_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{session_id}")
}
