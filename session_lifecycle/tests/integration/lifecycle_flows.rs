use std::sync::Arc;

use chrono::Duration;
use session_lifecycle::{Clock, InMemorySessionStore, SessionScope, SessionStore, UserId};

use crate::common::{manager_with_clock, start_time};

/// Login, a few weeks of regular use, logout
#[tokio::test]
async fn test_full_session_lifecycle() {
    let store = Arc::new(InMemorySessionStore::new());
    let (manager, clock) = manager_with_clock(store.clone());

    // Login: the caller has verified credentials and mints a session
    let mut login = SessionScope::new();
    let session_id = manager
        .create(&mut login, "alice")
        .await
        .expect("create session");
    let csrf = manager
        .current_csrf_token(&login)
        .cloned()
        .expect("csrf token after login");

    // Daily use for three weeks keeps the session alive past its first expiration
    for _ in 0..21 {
        clock.advance(Duration::days(1) + Duration::hours(1));
        let mut request = SessionScope::new();
        let user = manager
            .validate(&mut request, session_id.as_str())
            .await
            .expect("validate");
        assert_eq!(user, Some(UserId::new("alice")));
        assert!(manager.verify_csrf_token(&request, csrf.as_str()));
    }

    let stored = store
        .get(session_id.as_str())
        .await
        .expect("get")
        .expect("record");
    assert_eq!(stored.expires_at, clock.now() + Duration::days(14));
    assert!(stored.expires_at > start_time() + Duration::days(14));

    // Logout
    let mut logout = SessionScope::new();
    manager
        .validate(&mut logout, session_id.as_str())
        .await
        .expect("validate");
    assert!(manager.remove(&mut logout).await.expect("remove"));
    assert!(!manager.remove(&mut logout).await.expect("remove"));

    let mut after = SessionScope::new();
    assert_eq!(
        manager
            .validate(&mut after, session_id.as_str())
            .await
            .expect("validate"),
        None
    );
    assert!(store.is_empty().await);
}

/// A session left alone for longer than its lifetime is gone
#[tokio::test]
async fn test_abandoned_session_expires() {
    let store = Arc::new(InMemorySessionStore::new());
    let (manager, clock) = manager_with_clock(store.clone());

    let mut login = SessionScope::new();
    let session_id = manager.create(&mut login, "bob").await.expect("create");

    clock.advance(Duration::days(15));
    let mut request = SessionScope::new();
    let user = manager
        .validate(&mut request, session_id.as_str())
        .await
        .expect("validate");

    assert_eq!(user, None);
    assert_eq!(manager.current_csrf_token(&request), None);
}

/// Two users get distinct sessions and distinct CSRF tokens
#[tokio::test]
async fn test_sessions_are_isolated() {
    let store = Arc::new(InMemorySessionStore::new());
    let (manager, _clock) = manager_with_clock(store.clone());

    let mut alice = SessionScope::new();
    let mut bob = SessionScope::new();
    let alice_id = manager.create(&mut alice, "alice").await.expect("create");
    let bob_id = manager.create(&mut bob, "bob").await.expect("create");

    assert_ne!(alice_id, bob_id);
    assert_ne!(alice.csrf_token(), bob.csrf_token());

    // Bob's CSRF token is useless with Alice's session
    let bob_csrf = bob.csrf_token().cloned().expect("token");
    let mut request = SessionScope::new();
    manager
        .validate(&mut request, alice_id.as_str())
        .await
        .expect("validate");
    assert!(!manager.verify_csrf_token(&request, bob_csrf.as_str()));

    // Removing one leaves the other intact
    assert!(manager.remove(&mut bob).await.expect("remove"));
    let mut request = SessionScope::new();
    assert_eq!(
        manager
            .validate(&mut request, alice_id.as_str())
            .await
            .expect("validate"),
        Some(UserId::new("alice"))
    );
}

/// Generated session IDs carry at least 128 bits and a URL-safe alphabet
#[tokio::test]
async fn test_generated_ids_look_opaque() {
    let store = Arc::new(InMemorySessionStore::new());
    let (manager, _clock) = manager_with_clock(store);

    let mut scope = SessionScope::new();
    let session_id = manager.create(&mut scope, "carol").await.expect("create");

    assert!(session_id.as_str().len() >= 22);
    assert!(
        session_id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    );
    assert!(!session_id.as_str().contains("carol"));
}
