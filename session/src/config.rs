//! Session and cookie configuration.
//!
//! Configuration values are provided by the application. Both structs
//! deserialize with every field optional, so a host can load them from the
//! `session` / `cookie` sections of its own config file.

use crate::constants::DEFAULT_SESSION_NAME;
use crate::error::{Result, SessionError};
use serde::Deserialize;

/// Session store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie name carrying the session identifier.
    ///
    /// Default: `PHPSESSID`
    pub name: String,

    /// Session lifetime in seconds. `0` keeps records until removed.
    ///
    /// Default: 0
    pub expire: u64,

    /// Start the session as soon as the store is initialized.
    ///
    /// Default: false
    pub auto_start: bool,

    /// Persist through the shared table instead of the cache service.
    ///
    /// Default: false
    #[serde(alias = "use_swoole_table")]
    pub use_shared_table: bool,
}

impl SessionConfig {
    /// Create configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the document is not valid JSON or
    /// a field has the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use composable_rust_session::SessionConfig;
    ///
    /// let config = SessionConfig::from_json(r#"{"name": "SID", "auto_start": true}"#)?;
    /// assert_eq!(config.name, "SID");
    /// assert!(config.auto_start);
    /// assert_eq!(config.expire, 0);
    /// # Ok::<(), composable_rust_session::SessionError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))
    }

    /// Set the cookie name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the session lifetime in seconds.
    #[must_use]
    pub const fn with_expire(mut self, seconds: u64) -> Self {
        self.expire = seconds;
        self
    }

    /// Enable or disable auto start.
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Select the shared-table backend.
    #[must_use]
    pub const fn with_shared_table(mut self, enabled: bool) -> Self {
        self.use_shared_table = enabled;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_string(),
            expire: 0,
            auto_start: false,
            use_shared_table: false,
        }
    }
}

/// Defaults applied by [`CookieJar`](crate::CookieJar) to outgoing cookies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Prefix prepended to every cookie name.
    pub prefix: String,

    /// Default lifetime in seconds. `0` issues browser-session cookies.
    pub expire: u64,

    /// Cookie path.
    ///
    /// Default: `/`
    pub path: String,

    /// Cookie domain. `None` lets the browser use the request host.
    pub domain: Option<String>,

    /// Only send the cookie over HTTPS.
    pub secure: bool,

    /// Hide the cookie from client-side scripts.
    #[serde(alias = "httponly")]
    pub http_only: bool,
}

impl CookieConfig {
    /// Set the name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the default lifetime in seconds.
    #[must_use]
    pub const fn with_expire(mut self, seconds: u64) -> Self {
        self.expire = seconds;
        self
    }

    /// Set the cookie path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the `Secure` flag.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `HttpOnly` flag.
    #[must_use]
    pub const fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            expire: 0,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: false,
        }
    }
}
