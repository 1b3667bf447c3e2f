//! The session store.
//!
//! One [`SessionStore`] is owned per worker (or per server instance) and
//! handed to request handlers by `&mut` reference. It keeps the in-memory
//! mappings of every session it has touched, resolves the current session
//! from its cookie transport, and writes whole records back to its backend
//! after each mutation.
//!
//! # Lifecycle
//!
//! ```text
//! Unset ──init(auto_start=false)──▶ Paused ──accessor / start()──▶ Started
//!   │                                  ▲                              │
//!   └──────init(auto_start=true) / accessor────────────────────────▶ │
//!                                      └───────────pause()────────────┘
//! Started | Paused ──destroy()──▶ Unset
//! ```
//!
//! Every accessor (`get`, `set`, `has`, `delete`, `clear`) boots the store
//! first if it is not `Started`.

use crate::config::SessionConfig;
use crate::constants::session_key;
use crate::error::Result;
use crate::id::generate_session_id;
use crate::key::{self, SessionData, SessionKey, SessionKeys};
use crate::providers::{CookieTransport, SessionBackend};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Lifecycle state of a [`SessionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Never initialized, or destroyed.
    #[default]
    Unset,

    /// Initialized but not started; no data loaded for the current request.
    Paused,

    /// Identifier resolved and data loaded (possibly empty).
    Started,
}

/// Session key/value store bound to a backend and a cookie transport.
///
/// # Example
///
/// ```
/// use composable_rust_session::{CookieConfig, CookieJar, SessionConfig, SessionStore};
/// use composable_rust_session::stores::{ConfiguredBackend, MemoryCache, SharedTable};
/// use serde_json::json;
///
/// # async fn example() -> composable_rust_session::Result<()> {
/// let config = SessionConfig::default().with_expire(1440);
/// let backend = ConfiguredBackend::select(&config, SharedTable::new(), MemoryCache::new());
/// let cookies = CookieJar::from_header("", CookieConfig::default());
/// let mut session = SessionStore::new(config, backend, cookies);
///
/// session.set("user.name", "alice").await?;
/// assert_eq!(session.get("user.name").await?, Some(json!("alice")));
/// assert!(session.has("user").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionStore<B, C> {
    config: SessionConfig,
    session_name: String,
    expire: u64,
    state: SessionState,
    data: HashMap<String, SessionData>,
    backend: B,
    cookies: C,
}

impl<B: SessionBackend, C: CookieTransport> SessionStore<B, C> {
    /// Create a store.
    ///
    /// `config` is kept as the store's loaded configuration: `init(None)` and
    /// implicit boots apply it. The store starts `Unset`.
    #[must_use]
    pub fn new(config: SessionConfig, backend: B, cookies: C) -> Self {
        let mut store = Self {
            config,
            session_name: String::new(),
            expire: 0,
            state: SessionState::Unset,
            data: HashMap::new(),
            backend,
            cookies,
        };
        store.session_name.clone_from(&store.config.name);
        store.expire = store.config.expire;
        store
    }

    /// Initialize the store.
    ///
    /// `Some(config)` replaces the loaded configuration; `None` re-applies the
    /// one already held. An empty name or a zero expiry keeps the current
    /// value. With `auto_start` the session starts immediately, otherwise the
    /// store is `Paused`.
    ///
    /// # Errors
    ///
    /// Returns error if auto start cannot load from the backend.
    pub async fn init(&mut self, config: Option<SessionConfig>) -> Result<()> {
        if let Some(config) = config {
            self.config = config;
        }

        if !self.config.name.is_empty() {
            self.session_name.clone_from(&self.config.name);
        }

        if self.config.expire > 0 {
            self.expire = self.config.expire;
        }

        if self.config.auto_start {
            self.start().await
        } else {
            self.state = SessionState::Paused;
            Ok(())
        }
    }

    /// Bring the store to `Started`.
    ///
    /// No-op when already started; otherwise initializes from the loaded
    /// configuration if `Unset`, then starts if `Paused`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read.
    pub async fn boot(&mut self) -> Result<()> {
        if self.state == SessionState::Started {
            return Ok(());
        }

        if self.state == SessionState::Unset {
            self.init(None).await?;
        }

        if self.state == SessionState::Paused {
            self.start().await?;
        }

        Ok(())
    }

    /// Resolve the current identifier and load its data.
    ///
    /// Issues a new identifier when the client has none. Data already held in
    /// memory is not reloaded. A missing, expired or empty record still
    /// starts the session with an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read.
    pub async fn start(&mut self) -> Result<()> {
        let session_id = self.id(true);

        if self.data.get(&session_id).is_none_or(SessionData::is_empty) {
            let key = session_key(&session_id);

            if let Some(data) = self.backend.load(&key).await? {
                tracing::debug!(session_key = %key, keys = data.len(), "Loaded session");
                if !data.is_empty() {
                    self.data.insert(session_id, data);
                }
            }
        }

        self.state = SessionState::Started;
        Ok(())
    }

    /// Stop treating the session as started. Data is left untouched; the
    /// next accessor starts it again.
    pub const fn pause(&mut self) {
        self.state = SessionState::Paused;
    }

    /// Current session identifier.
    ///
    /// Reads the cookie named by the session name. When the client sent none,
    /// `regenerate` issues a fresh identifier; without it the result is an
    /// empty string, meaning "no active session".
    pub fn id(&mut self, regenerate: bool) -> String {
        match self.cookies.get(&self.session_name) {
            Some(session_id) if !session_id.is_empty() => session_id,
            _ if regenerate => self.issue_id(),
            _ => String::new(),
        }
    }

    /// Send `session_id` to the client.
    ///
    /// `expire` of `None` uses the cookie transport's default lifetime.
    pub fn set_id(&mut self, session_id: &str, expire: Option<u64>) {
        self.cookies.set(&self.session_name, session_id, expire, None);
    }

    /// Change the cookie name used to resolve the identifier.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.session_name = name.into();
    }

    /// Read a value.
    ///
    /// An empty `name` returns the whole mapping as an object (empty when the
    /// session has no data). Dotted names walk one level per segment; any
    /// missing segment yields `None`.
    ///
    /// # Errors
    ///
    /// Returns error if booting the session fails.
    pub async fn get(&mut self, name: &str) -> Result<Option<Value>> {
        self.ensure_booted().await?;
        let session_id = self.id(true);
        let data = self.data.get(&session_id);

        if name.is_empty() {
            return Ok(Some(Value::Object(data.cloned().unwrap_or_default())));
        }

        Ok(data.and_then(|data| key::lookup(data, name)).cloned())
    }

    /// Read a value and deserialize it.
    ///
    /// Values that are missing or do not fit `T` read as `None`.
    ///
    /// # Errors
    ///
    /// Returns error if booting the session fails.
    pub async fn get_as<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        Ok(self
            .get(name)
            .await?
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Write a value and persist the session.
    ///
    /// `group.field` writes inside the `group` object, creating it when
    /// missing; deeper segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if booting fails or the record cannot be written.
    pub async fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_booted().await?;
        let session_id = self.id(true);

        key::assign(
            self.data.entry(session_id.clone()).or_default(),
            SessionKey::parse(name),
            value.into(),
        );

        self.write(&session_id).await
    }

    /// Returns `true` if every segment of `name` is present.
    ///
    /// Never issues an identifier: without one the answer is `false`.
    ///
    /// # Errors
    ///
    /// Returns error if booting the session fails.
    pub async fn has(&mut self, name: &str) -> Result<bool> {
        self.ensure_booted().await?;
        let session_id = self.id(false);

        if session_id.is_empty() {
            return Ok(false);
        }

        Ok(self
            .data
            .get(&session_id)
            .is_some_and(|data| key::contains(data, name)))
    }

    /// Remove one or more keys and persist the session.
    ///
    /// Accepts a key, a dotted key, or a list of either. Does nothing when
    /// the client has no session.
    ///
    /// # Errors
    ///
    /// Returns error if booting fails or the record cannot be written.
    pub async fn delete(&mut self, keys: impl Into<SessionKeys>) -> Result<()> {
        self.ensure_booted().await?;
        let session_id = self.id(false);

        if session_id.is_empty() {
            return Ok(());
        }

        let keys: SessionKeys = keys.into();
        if let Some(data) = self.data.get_mut(&session_id) {
            for name in keys.iter() {
                key::remove(data, SessionKey::parse(name));
            }
        }

        self.write(&session_id).await
    }

    /// Empty the session and delete its backend record.
    ///
    /// # Errors
    ///
    /// Returns error if booting fails or the record cannot be deleted.
    pub async fn clear(&mut self) -> Result<()> {
        self.ensure_booted().await?;
        let session_id = self.id(false);

        if session_id.is_empty() {
            return Ok(());
        }

        self.backend.remove(&session_key(&session_id)).await?;
        self.data.insert(session_id, SessionData::new());
        Ok(())
    }

    /// Drop the session from memory and from the backend, and reset the
    /// store to `Unset`.
    ///
    /// The identifier cookie is left as is; see
    /// [`regenerate`](Self::regenerate) to replace it.
    ///
    /// # Errors
    ///
    /// Returns error if the backend record cannot be deleted.
    pub async fn destroy(&mut self) -> Result<()> {
        let session_id = self.id(false);

        if !session_id.is_empty() {
            let key = session_key(&session_id);
            self.backend.remove(&key).await?;
            self.data.remove(&session_id);
            tracing::info!(session_key = %key, "Destroyed session");
        }

        self.state = SessionState::Unset;
        Ok(())
    }

    /// Issue a new identifier and return it.
    ///
    /// With `delete_old` the current session is destroyed first; otherwise
    /// its record stays in the backend under the old identifier.
    ///
    /// # Errors
    ///
    /// Returns error if destroying the old session fails.
    pub async fn regenerate(&mut self, delete_old: bool) -> Result<String> {
        if delete_old {
            self.destroy().await?;
        }

        Ok(self.issue_id())
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Cookie name carrying the identifier.
    #[must_use]
    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Record lifetime in seconds (`0` for none).
    #[must_use]
    pub const fn expire(&self) -> u64 {
        self.expire
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Persistence backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Cookie transport of the current request.
    #[must_use]
    pub const fn cookies(&self) -> &C {
        &self.cookies
    }

    /// Mutable cookie transport, e.g. to drain outgoing cookies.
    pub const fn cookies_mut(&mut self) -> &mut C {
        &mut self.cookies
    }

    /// Bind the store to the next request's cookie transport, returning the
    /// previous one.
    ///
    /// Data held for the previous request is dropped and a started store is
    /// paused, so the next accessor loads the new request's session from the
    /// backend.
    pub fn replace_cookies(&mut self, cookies: C) -> C {
        self.data.clear();
        if self.state == SessionState::Started {
            self.state = SessionState::Paused;
        }
        std::mem::replace(&mut self.cookies, cookies)
    }

    async fn ensure_booted(&mut self) -> Result<()> {
        if self.state != SessionState::Started {
            self.boot().await?;
        }
        Ok(())
    }

    fn issue_id(&mut self) -> String {
        let session_id = generate_session_id();
        self.set_id(&session_id, None);
        tracing::info!(session_name = %self.session_name, "Issued new session identifier");
        session_id
    }

    async fn write(&self, session_id: &str) -> Result<()> {
        let empty = SessionData::new();
        let data = self.data.get(session_id).unwrap_or(&empty);

        self.backend
            .save(&session_key(session_id), data, self.expire)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookieConfig;
    use crate::cookie_jar::CookieJar;
    use crate::providers::CacheService;
    use crate::stores::{CacheBackend, MemoryCache};
    use serde_json::json;

    type TestStore = SessionStore<CacheBackend<MemoryCache>, CookieJar>;

    fn store(config: SessionConfig, header: &str) -> (TestStore, MemoryCache) {
        let cache = MemoryCache::new();
        let jar = CookieJar::from_header(header, CookieConfig::default());
        (SessionStore::new(config, CacheBackend::new(cache.clone()), jar), cache)
    }

    #[tokio::test]
    async fn test_init_without_auto_start_pauses() {
        let (mut session, _) = store(SessionConfig::default(), "");
        assert_eq!(session.state(), SessionState::Unset);

        session.init(None).await.expect("init");

        assert_eq!(session.state(), SessionState::Paused);
        assert!(session.cookies().pending().is_empty());
    }

    #[tokio::test]
    async fn test_init_with_auto_start_issues_id() {
        let (mut session, _) = store(SessionConfig::default(), "");

        session
            .init(Some(SessionConfig::default().with_name("SID").with_auto_start(true)))
            .await
            .expect("init");

        assert_eq!(session.state(), SessionState::Started);
        assert_eq!(session.session_name(), "SID");
        assert_eq!(session.cookies().pending()[0].name, "SID");
    }

    #[tokio::test]
    async fn test_init_keeps_previous_name_and_expire_when_unset() {
        let config = SessionConfig::default().with_name("SID").with_expire(600);
        let (mut session, _) = store(config, "");

        session
            .init(Some(SessionConfig::default().with_name("").with_expire(0)))
            .await
            .expect("init");

        assert_eq!(session.session_name(), "SID");
        assert_eq!(session.expire(), 600);
    }

    #[tokio::test]
    async fn test_accessor_boots_unset_store() {
        let (mut session, _) = store(SessionConfig::default(), "PHPSESSID=abc");

        assert_eq!(session.get("missing").await.expect("get"), None);
        assert_eq!(session.state(), SessionState::Started);
    }

    #[tokio::test]
    async fn test_pause_keeps_data() {
        let (mut session, _) = store(SessionConfig::default(), "PHPSESSID=abc");
        session.set("user", "alice").await.expect("set");

        session.pause();
        assert_eq!(session.state(), SessionState::Paused);

        assert_eq!(session.get("user").await.expect("get"), Some(json!("alice")));
        assert_eq!(session.state(), SessionState::Started);
    }

    #[tokio::test]
    async fn test_get_empty_name_returns_whole_mapping() {
        let (mut session, _) = store(SessionConfig::default(), "PHPSESSID=abc");
        assert_eq!(session.get("").await.expect("get"), Some(json!({})));

        session.set("a", 1).await.expect("set");
        session.set("b.c", true).await.expect("set");

        assert_eq!(
            session.get("").await.expect("get"),
            Some(json!({ "a": 1, "b": { "c": true } }))
        );
    }

    #[tokio::test]
    async fn test_get_as_deserializes() {
        let (mut session, _) = store(SessionConfig::default(), "PHPSESSID=abc");
        session.set("count", 7).await.expect("set");

        assert_eq!(session.get_as::<u32>("count").await.expect("get"), Some(7));
        assert_eq!(session.get_as::<String>("count").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_set_persists_whole_mapping() {
        let (mut session, cache) = store(SessionConfig::default(), "PHPSESSID=abc");

        session.set("a", 1).await.expect("set");
        session.set("b", 2).await.expect("set");

        let stored = cache.get("sess_abc").await.expect("get").expect("record");
        let stored: Value = serde_json::from_slice(&stored).expect("json");
        assert_eq!(stored, json!({ "a": 1, "b": 2 }));
    }

    #[tokio::test]
    async fn test_has_without_cookie_is_false_and_issues_nothing() {
        let (mut session, _) = store(SessionConfig::default(), "");
        session.state = SessionState::Started;

        assert!(!session.has("user").await.expect("has"));
        assert!(session.cookies().pending().is_empty());
        assert_eq!(session.id(false), "");
    }

    #[tokio::test]
    async fn test_delete_list_of_keys() {
        let (mut session, _) = store(SessionConfig::default(), "PHPSESSID=abc");
        session.set("a", 1).await.expect("set");
        session.set("b.c", 2).await.expect("set");
        session.set("b.d", 3).await.expect("set");

        session.delete(vec!["a", "b.c"]).await.expect("delete");

        assert_eq!(session.get("").await.expect("get"), Some(json!({ "b": { "d": 3 } })));
    }

    #[tokio::test]
    async fn test_set_name_switches_cookie() {
        let (mut session, _) = store(SessionConfig::default(), "PHPSESSID=abc; OTHER=xyz");
        session.set_name("OTHER");

        assert_eq!(session.id(false), "xyz");
    }

    #[tokio::test]
    async fn test_destroy_resets_state() {
        let (mut session, cache) = store(SessionConfig::default(), "PHPSESSID=abc");
        session.set("user", "alice").await.expect("set");

        session.destroy().await.expect("destroy");

        assert_eq!(session.state(), SessionState::Unset);
        assert!(cache.is_empty().expect("is_empty"));
        assert_eq!(session.get("user").await.expect("get"), None);
    }
}
