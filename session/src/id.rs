//! Session identifier generation.

use crate::constants::SESSION_ID_BYTES;

/// Generate a cryptographically secure session identifier.
///
/// Returns a 256-bit random token encoded as base64url (43 characters), which
/// is safe to use as a cookie value without further encoding.
///
/// # Examples
///
/// ```
/// use composable_rust_session::generate_session_id;
///
/// let id = generate_session_id();
/// assert_eq!(id.len(), 43);
/// assert_ne!(id, generate_session_id());
/// ```
#[must_use]
pub fn generate_session_id() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut rng = rand::thread_rng();
    let mut random_bytes = [0u8; SESSION_ID_BYTES];
    rng.fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}
