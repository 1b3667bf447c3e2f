//! Both backends must behave the same for identical operation sequences;
//! they differ only in how expiry is tracked.

use chrono::{Duration, TimeZone, Utc};
use composable_rust_session::mocks::MockClock;
use composable_rust_session::providers::SessionBackend;
use composable_rust_session::stores::{
    CacheBackend, ConfiguredBackend, MemoryCache, SharedTable, SharedTableBackend, TableEntry,
};
use composable_rust_session::{CookieConfig, CookieJar, SessionConfig, SessionStore};
use serde_json::{Value, json};
use std::sync::Arc;

fn configured(use_shared_table: bool) -> (SessionConfig, ConfiguredBackend<MemoryCache>) {
    let config = SessionConfig::default()
        .with_expire(1440)
        .with_shared_table(use_shared_table);
    let backend = ConfiguredBackend::select(&config, SharedTable::new(), MemoryCache::new());
    (config, backend)
}

/// Runs a fixed script and returns every observation made along the way.
async fn run_script(use_shared_table: bool) -> Vec<Value> {
    let (config, backend) = configured(use_shared_table);
    let mut observations = Vec::new();

    let mut session = SessionStore::new(
        config.clone(),
        backend.clone(),
        CookieJar::from_header("PHPSESSID=script", CookieConfig::default()),
    );

    session.set("user.name", "alice").await.expect("set");
    session.set("user.role", "admin").await.expect("set");
    session.set("visits", 1).await.expect("set");
    observations.push(session.get("").await.expect("get").unwrap_or(Value::Null));

    session.delete(["user.role", "missing"]).await.expect("delete");
    session.set("visits", 2).await.expect("set");
    observations.push(json!(session.has("user.role").await.expect("has")));

    // A second request on the same identifier reads from the backend
    let mut next = SessionStore::new(
        config,
        backend,
        CookieJar::from_header("PHPSESSID=script", CookieConfig::default()),
    );
    observations.push(next.get("").await.expect("get").unwrap_or(Value::Null));
    observations.push(next.get("user.name").await.expect("get").unwrap_or(Value::Null));

    next.clear().await.expect("clear");
    observations.push(next.get("").await.expect("get").unwrap_or(Value::Null));

    observations
}

#[tokio::test]
async fn test_backends_observe_identical_results() {
    let table = run_script(true).await;
    let cache = run_script(false).await;

    assert_eq!(table, cache);
    assert_eq!(
        table,
        vec![
            json!({ "user": { "name": "alice", "role": "admin" }, "visits": 1 }),
            json!(false),
            json!({ "user": { "name": "alice" }, "visits": 2 }),
            json!("alice"),
            json!({}),
        ]
    );
}

#[tokio::test]
async fn test_shared_table_is_visible_across_workers() {
    let table = SharedTable::new();
    let config = SessionConfig::default().with_shared_table(true);

    let mut worker_a = SessionStore::new(
        config.clone(),
        ConfiguredBackend::select(&config, table.clone(), MemoryCache::new()),
        CookieJar::from_header("PHPSESSID=shared", CookieConfig::default()),
    );
    let mut worker_b = SessionStore::new(
        config.clone(),
        ConfiguredBackend::select(&config, table.clone(), MemoryCache::new()),
        CookieJar::from_header("PHPSESSID=shared", CookieConfig::default()),
    );

    worker_a.set("theme", "dark").await.expect("set");

    assert_eq!(worker_b.get("theme").await.expect("get"), Some(json!("dark")));
    assert!(table.get("sess_shared").expect("get").is_some());
}

#[tokio::test]
async fn test_shared_table_honours_absolute_expiry() {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date");
    let clock = MockClock::new(start);
    let table = SharedTable::new();
    let backend = SharedTableBackend::with_clock(table.clone(), Arc::new(clock.clone()));
    let config = SessionConfig::default().with_expire(60);

    let mut session = SessionStore::new(
        config.clone(),
        backend.clone(),
        CookieJar::from_header("PHPSESSID=ttl", CookieConfig::default()),
    );
    session.set("user", "alice").await.expect("set");

    let row = table.get("sess_ttl").expect("get").expect("row");
    assert_eq!(row.expire, start.timestamp() + 60);

    clock.advance(Duration::seconds(60));
    let mut on_time = SessionStore::new(
        config.clone(),
        backend.clone(),
        CookieJar::from_header("PHPSESSID=ttl", CookieConfig::default()),
    );
    assert_eq!(on_time.get("user").await.expect("get"), Some(json!("alice")));

    clock.advance(Duration::seconds(1));
    let mut late = SessionStore::new(
        config,
        backend,
        CookieJar::from_header("PHPSESSID=ttl", CookieConfig::default()),
    );
    assert_eq!(late.get("user").await.expect("get"), None);
    assert!(table.get("sess_ttl").expect("get").is_none());
}

#[tokio::test]
async fn test_shared_table_zero_expire_row_never_expires() {
    let table = SharedTable::new();
    table
        .set(
            "sess_forever",
            TableEntry {
                data: r#"{"user":"alice"}"#.to_string(),
                expire: 0,
            },
        )
        .expect("set");

    let backend = SharedTableBackend::new(table);
    let loaded = backend.load("sess_forever").await.expect("load");

    assert_eq!(
        loaded.and_then(|data| data.get("user").cloned()),
        Some(json!("alice"))
    );
}

#[tokio::test]
async fn test_cache_backend_defers_expiry_to_cache() {
    let clock = MockClock::new(Utc::now());
    let cache = MemoryCache::with_clock(Arc::new(clock.clone()));
    let config = SessionConfig::default().with_expire(30);

    let mut session = SessionStore::new(
        config.clone(),
        CacheBackend::new(cache.clone()),
        CookieJar::from_header("PHPSESSID=ttl", CookieConfig::default()),
    );
    session.set("user", "alice").await.expect("set");

    clock.advance(Duration::seconds(30));

    let mut later = SessionStore::new(
        config,
        CacheBackend::new(cache),
        CookieJar::from_header("PHPSESSID=ttl", CookieConfig::default()),
    );
    assert_eq!(later.get("user").await.expect("get"), None);
}
