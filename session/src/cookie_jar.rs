//! Request-scoped cookie jar.
//!
//! A [`CookieJar`] is built from the request's `Cookie` header, answers reads
//! for the rest of the request, and collects outgoing [`SetCookie`] values for
//! the response. Values set during the request are visible to later reads, so
//! an identifier issued mid-request resolves consistently.

use crate::config::CookieConfig;
use crate::providers::{Clock, CookieOptions, CookieTransport, SystemClock};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An outgoing cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Full cookie name, prefix included.
    pub name: String,

    /// Raw (unencoded) value.
    pub value: String,

    /// `Max-Age` in seconds. `None` for browser-session cookies.
    pub max_age: Option<u64>,

    /// `Expires` timestamp matching `max_age`.
    pub expires: Option<DateTime<Utc>>,

    /// Cookie path.
    pub path: String,

    /// Cookie domain.
    pub domain: Option<String>,

    /// `Secure` flag.
    pub secure: bool,

    /// `HttpOnly` flag.
    pub http_only: bool,
}

impl fmt::Display for SetCookie {
    /// Renders the `Set-Cookie` header value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, urlencoding::encode(&self.value))?;

        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT"))?;
        }
        if !self.path.is_empty() {
            write!(f, "; Path={}", self.path)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }

        Ok(())
    }
}

/// Cookie transport for a single request/response exchange.
///
/// # Example
///
/// ```
/// use composable_rust_session::{CookieConfig, CookieJar};
/// use composable_rust_session::providers::CookieTransport;
///
/// let mut jar = CookieJar::from_header("theme=dark; lang=en", CookieConfig::default());
/// assert_eq!(jar.get("theme").as_deref(), Some("dark"));
///
/// jar.set("theme", "light", Some(3600), None);
/// assert_eq!(jar.get("theme").as_deref(), Some("light"));
/// assert!(jar.set_cookie_headers()[0].starts_with("theme=light; Max-Age=3600"));
/// ```
pub struct CookieJar {
    config: CookieConfig,
    cookies: HashMap<String, String>,
    pending: Vec<SetCookie>,
    clock: Arc<dyn Clock>,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new(config: CookieConfig) -> Self {
        Self {
            config,
            cookies: HashMap::new(),
            pending: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a jar from a `Cookie` request header (`a=1; b=2`).
    ///
    /// Values are percent-decoded; pairs without `=` or with an empty name are
    /// skipped. When a name repeats, the first value wins: browsers send the
    /// cookie with the most specific path first.
    #[must_use]
    pub fn from_header(header: &str, config: CookieConfig) -> Self {
        let mut jar = Self::new(config);

        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let value = value.trim();
            let value = urlencoding::decode(value)
                .map_or_else(|_| value.to_string(), std::borrow::Cow::into_owned);
            jar.cookies.entry(name.to_string()).or_insert(value);
        }

        jar
    }

    /// Use a different clock for `Expires` timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Jar defaults.
    #[must_use]
    pub const fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Returns `true` if the named cookie is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(&self.full_name(name))
    }

    /// Cookies set or deleted during this request, in order.
    #[must_use]
    pub fn pending(&self) -> &[SetCookie] {
        &self.pending
    }

    /// Drain the outgoing cookies, e.g. when writing the response.
    pub fn take_pending(&mut self) -> Vec<SetCookie> {
        std::mem::take(&mut self.pending)
    }

    /// Rendered `Set-Cookie` header values.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.pending.iter().map(ToString::to_string).collect()
    }

    fn full_name(&self, name: &str) -> String {
        format!("{}{name}", self.config.prefix)
    }

    fn queue(&mut self, cookie: SetCookie) {
        self.pending.retain(|pending| pending.name != cookie.name);
        self.pending.push(cookie);
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("config", &self.config)
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl CookieTransport for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.get(&self.full_name(name)).cloned()
    }

    fn set(&mut self, name: &str, value: &str, expire: Option<u64>, options: Option<&CookieOptions>) {
        let full_name = self.full_name(name);
        let expire = expire.unwrap_or(self.config.expire);

        let (max_age, expires) = if expire > 0 {
            let expires = i64::try_from(expire)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|ttl| self.clock.now().checked_add_signed(ttl));
            (Some(expire), expires)
        } else {
            (None, None)
        };

        let cookie = match options {
            Some(options) => SetCookie {
                name: full_name.clone(),
                value: value.to_string(),
                max_age,
                expires,
                path: options.path.clone(),
                domain: options.domain.clone(),
                secure: options.secure,
                http_only: options.http_only,
            },
            None => SetCookie {
                name: full_name.clone(),
                value: value.to_string(),
                max_age,
                expires,
                path: self.config.path.clone(),
                domain: self.config.domain.clone(),
                secure: self.config.secure,
                http_only: self.config.http_only,
            },
        };

        self.queue(cookie);
        self.cookies.insert(full_name, value.to_string());
    }

    fn delete(&mut self, name: &str) {
        let full_name = self.full_name(name);
        self.cookies.remove(&full_name);

        self.queue(SetCookie {
            name: full_name,
            value: String::new(),
            max_age: Some(0),
            expires: Some(DateTime::<Utc>::default()),
            path: self.config.path.clone(),
            domain: self.config.domain.clone(),
            secure: self.config.secure,
            http_only: self.config.http_only,
        });
    }
}
