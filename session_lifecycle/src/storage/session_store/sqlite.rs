use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::storage::config::DB_TABLE_SESSIONS;
use crate::storage::errors::StorageError;
use crate::storage::types::StoredSession;

use super::types::{SessionStore, SqliteSessionStore};

impl SqliteSessionStore {
    /// Create a lazily connecting store for `url` (e.g. `sqlite:sessions.db`).
    ///
    /// In-memory databases are pinned to a single long-lived connection, since every
    /// SQLite connection would otherwise see its own empty database.
    pub fn new(url: &str) -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_lazy_with(opts)
        } else {
            SqlitePoolOptions::new().connect_lazy_with(opts)
        };

        Ok(Self { pool })
    }

    pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table_name} (
                session_id TEXT PRIMARY KEY NOT NULL,
                user_id TEXT NOT NULL,
                csrf_token TEXT NOT NULL,
                expires_at TIMESTAMP NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<StoredSession>, StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let session = sqlx::query_as::<_, StoredSession>(&format!(
            r#"
            SELECT session_id, user_id, csrf_token, expires_at FROM {table_name} WHERE session_id = ?
            "#
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn create(&self, session: &StoredSession) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {table_name} (session_id, user_id, csrf_token, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (session_id) DO NOTHING
            "#
        ))
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.csrf_token)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict(
                "session id already exists".to_string(),
            ));
        }
        Ok(())
    }

    async fn update_expiration(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let result = sqlx::query(&format!(
            r#"
            UPDATE {table_name} SET expires_at = ? WHERE session_id = ?
            "#
        ))
        .bind(expires_at)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let result = sqlx::query(&format!(
            r#"
            DELETE FROM {table_name} WHERE session_id = ?
            "#
        ))
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let result = sqlx::query(&format!(
            r#"
            DELETE FROM {table_name} WHERE expires_at <= ?
            "#
        ))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
