use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;
use crate::storage::types::StoredSession;

/// Sessions held in process memory; lost on restart
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    pub(super) entries: Mutex<HashMap<String, StoredSession>>,
}

#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    pub(super) client: redis::Client,
}

#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pub(super) pool: sqlx::SqlitePool,
}

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pub(super) pool: sqlx::PgPool,
}

/// Persistence contract for session records.
///
/// Every operation must be strongly consistent for a given session ID and must
/// never leave a partially written record behind. Records past their
/// expiration are only removed when looked up or by [`SessionStore::delete_expired`];
/// backends without native expiry (the SQL ones) need that called periodically.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Prepare the backend (create tables, verify the connection).
    async fn init(&self) -> Result<(), StorageError>;

    /// Fetch the record for `session_id`, if any.
    async fn get(&self, session_id: &str) -> Result<Option<StoredSession>, StorageError>;

    /// Persist a new record.
    ///
    /// Returns [`StorageError::Conflict`] when the ID is already taken; an existing
    /// record is never overwritten.
    async fn create(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Set the expiration of an existing record. Returns `false` if there is none.
    async fn update_expiration(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Delete a record. Returns `false` if there was none.
    async fn delete(&self, session_id: &str) -> Result<bool, StorageError>;

    /// Delete every record with `expires_at <= now` and return how many were removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}
