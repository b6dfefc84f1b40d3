use std::sync::Arc;

use chrono::Duration;
use serial_test::serial;
use session_lifecycle::{Clock, SessionScope, SessionStore, SqliteSessionStore, UserId};

use crate::common::manager_with_clock;

async fn sqlite_store() -> Arc<SqliteSessionStore> {
    let store = SqliteSessionStore::new("sqlite::memory:").expect("sqlite url");
    store.init().await.expect("create table");
    Arc::new(store)
}

#[tokio::test]
async fn test_lifecycle_on_sqlite() {
    let store = sqlite_store().await;
    let (manager, clock) = manager_with_clock(store.clone());

    let mut login = SessionScope::new();
    let session_id = manager.create(&mut login, "dave").await.expect("create");

    clock.advance(Duration::days(2));
    let mut request = SessionScope::new();
    let user = manager
        .validate(&mut request, session_id.as_str())
        .await
        .expect("validate");
    assert_eq!(user, Some(UserId::new("dave")));
    assert_eq!(request.csrf_token(), login.csrf_token());

    let stored = store
        .get(session_id.as_str())
        .await
        .expect("get")
        .expect("record");
    assert_eq!(stored.expires_at, clock.now() + Duration::days(14));

    assert!(manager.remove(&mut request).await.expect("remove"));
    assert!(store.get(session_id.as_str()).await.expect("get").is_none());
}

/// Abandoned sessions are cleared from SQL tables without being looked up
#[tokio::test]
async fn test_purge_abandoned_sessions_on_sqlite() {
    let store = sqlite_store().await;
    let (manager, clock) = manager_with_clock(store.clone());

    let mut abandoned = SessionScope::new();
    let abandoned_id = manager
        .create(&mut abandoned, "frank")
        .await
        .expect("create");
    clock.advance(Duration::days(7));
    let mut active = SessionScope::new();
    let active_id = manager.create(&mut active, "grace").await.expect("create");

    clock.advance(Duration::days(8));
    assert_eq!(manager.purge_expired().await.expect("purge"), 1);

    assert!(store.get(abandoned_id.as_str()).await.expect("get").is_none());
    assert!(store.get(active_id.as_str()).await.expect("get").is_some());
}

#[tokio::test]
#[serial]
async fn test_init_from_environment() {
    crate::common::init_test_environment();
    let original = std::env::var("SESSION_STORE_TYPE").ok();
    unsafe {
        std::env::set_var("SESSION_STORE_TYPE", "memory");
    }

    let result = session_lifecycle::init().await;

    match original {
        Some(val) => unsafe { std::env::set_var("SESSION_STORE_TYPE", val) },
        None => unsafe { std::env::remove_var("SESSION_STORE_TYPE") },
    }
    let manager = result.expect("init from env");

    let mut scope = SessionScope::new();
    let session_id = manager.create(&mut scope, "erin").await.expect("create");
    let mut request = SessionScope::new();
    assert_eq!(
        manager
            .validate(&mut request, session_id.as_str())
            .await
            .expect("validate"),
        Some(UserId::new("erin"))
    );

    request.settle().await;
}
