use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;

use crate::storage::errors::StorageError;
use crate::storage::types::StoredSession;

use super::types::{InMemorySessionStore, SessionStore};

impl InMemorySessionStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self::default()
    }

    /// Number of records currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn get(&self, session_id: &str) -> Result<Option<StoredSession>, StorageError> {
        Ok(self.entries.lock().await.get(session_id).cloned())
    }

    async fn create(&self, session: &StoredSession) -> Result<(), StorageError> {
        match self.entries.lock().await.entry(session.session_id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(
                "session id already exists".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn update_expiration(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        match self.entries.lock().await.get_mut(session_id) {
            Some(session) => {
                session.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StorageError> {
        Ok(self.entries.lock().await.remove(session_id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, session| !session.is_expired_at(now));
        Ok((before - entries.len()) as u64)
    }
}
