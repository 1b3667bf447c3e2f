//! Cookie transport trait.

/// Per-cookie attributes that override transport defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie path.
    pub path: String,

    /// Cookie domain.
    pub domain: Option<String>,

    /// `Secure` flag.
    pub secure: bool,

    /// `HttpOnly` flag.
    pub http_only: bool,
}

/// Reads and writes named cookies for the current request.
///
/// The session store only calls [`get`](Self::get) and [`set`](Self::set)
/// with a name, value and expiry, relying on the transport's defaults for
/// everything else.
pub trait CookieTransport: Send {
    /// Value of the named cookie, if the client sent it or it was set earlier
    /// in this request.
    fn get(&self, name: &str) -> Option<String>;

    /// Set a cookie.
    ///
    /// # Arguments
    ///
    /// - `expire`: Lifetime in seconds; `None` uses the transport default and
    ///   `Some(0)` issues a browser-session cookie
    /// - `options`: Attribute overrides; `None` uses the transport defaults
    fn set(&mut self, name: &str, value: &str, expire: Option<u64>, options: Option<&CookieOptions>);

    /// Expire a cookie on the client and forget it for this request.
    fn delete(&mut self, name: &str);
}
