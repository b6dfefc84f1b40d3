//! Test utilities shared by the unit tests of this crate
//!
//! Provides an instrumented session store, scripted token generators and a
//! manager factory wired to a [`ManualClock`], so lifecycle behavior can be
//! checked without real time passing or real backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{RefreshMode, SessionConfig};
use crate::session::{ManualClock, SessionManager, TokenGenerator};
use crate::storage::{InMemorySessionStore, SessionStore, StorageError, StoredSession};
use crate::utils::UtilError;

/// Fixed starting instant for deterministic tests
pub(crate) fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// In-memory store that counts calls and can be told to fail
#[derive(Default)]
pub(crate) struct RecordingStore {
    pub(crate) inner: InMemorySessionStore,
    pub(crate) gets: AtomicUsize,
    pub(crate) creates: AtomicUsize,
    pub(crate) deletes: AtomicUsize,
    pub(crate) updates: Mutex<Vec<(String, DateTime<Utc>)>>,
    pub(crate) fail_all: AtomicBool,
    pub(crate) fail_updates: AtomicBool,
}

impl RecordingStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn update_calls(&self) -> Vec<(String, DateTime<Utc>)> {
        self.updates.lock().expect("updates lock").clone()
    }

    pub(crate) fn set_unavailable(&self, down: bool) {
        self.fail_all.store(down, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StorageError::Storage("store is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.inner.init().await
    }

    async fn get(&self, session_id: &str) -> Result<Option<StoredSession>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.inner.get(session_id).await
    }

    async fn create(&self, session: &StoredSession) -> Result<(), StorageError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.inner.create(session).await
    }

    async fn update_expiration(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.updates
            .lock()
            .expect("updates lock")
            .push((session_id.to_string(), expires_at));
        self.check_available()?;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StorageError::Storage("write rejected".to_string()));
        }
        self.inner.update_expiration(session_id, expires_at).await
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.inner.delete(session_id).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        self.check_available()?;
        self.inner.delete_expired(now).await
    }
}

/// Token generator replaying a fixed list, then falling back to numbered tokens
#[derive(Default)]
pub(crate) struct ScriptedTokens {
    queue: Mutex<VecDeque<String>>,
    counter: AtomicUsize,
}

impl ScriptedTokens {
    pub(crate) fn new(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
            counter: AtomicUsize::new(0),
        })
    }
}

impl TokenGenerator for ScriptedTokens {
    fn random(&self, _length: usize) -> Result<String, UtilError> {
        if let Some(token) = self.queue.lock().expect("queue lock").pop_front() {
            return Ok(token);
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("generated-token-{n}"))
    }
}

/// Token generator whose entropy source is broken
pub(crate) struct BrokenTokens;

impl TokenGenerator for BrokenTokens {
    fn random(&self, _length: usize) -> Result<String, UtilError> {
        Err(UtilError::Crypto("entropy source unavailable".to_string()))
    }
}

/// Manager over `store` with a manual clock at [`t0`] and inline refreshes
pub(crate) fn test_manager(store: Arc<dyn SessionStore>) -> (SessionManager, Arc<ManualClock>) {
    test_manager_with(
        store,
        SessionConfig::default().with_refresh_mode(RefreshMode::Inline),
    )
}

pub(crate) fn test_manager_with(
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
) -> (SessionManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let manager = SessionManager::builder(store)
        .config(config)
        .clock(clock.clone())
        .build()
        .expect("valid test configuration");
    (manager, clock)
}
