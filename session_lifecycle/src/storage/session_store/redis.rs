use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{self, AsyncCommands};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::storage::errors::StorageError;
use crate::storage::types::StoredSession;

use super::types::{RedisSessionStore, SessionStore};

const SESSION_PREFIX: &str = "session";

// KEYS[1] = key; ARGV = user_id, csrf_token, expires_at (RFC 3339), expires_at (unix)
static CREATE_SCRIPT: LazyLock<redis::Script> = LazyLock::new(|| {
    redis::Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 1 then
            return 0
        end
        redis.call('HSET', KEYS[1], 'user_id', ARGV[1], 'csrf_token', ARGV[2], 'expires_at', ARGV[3])
        redis.call('EXPIREAT', KEYS[1], ARGV[4])
        return 1
        ",
    )
});

// KEYS[1] = key; ARGV = expires_at (RFC 3339), expires_at (unix)
static UPDATE_EXPIRATION_SCRIPT: LazyLock<redis::Script> = LazyLock::new(|| {
    redis::Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return 0
        end
        redis.call('HSET', KEYS[1], 'expires_at', ARGV[1])
        redis.call('EXPIREAT', KEYS[1], ARGV[2])
        return 1
        ",
    )
});

impl RedisSessionStore {
    pub fn new(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }

    fn make_key(session_id: &str) -> String {
        format!("{SESSION_PREFIX}:{session_id}")
    }

    fn from_hash(
        session_id: &str,
        mut fields: HashMap<String, String>,
    ) -> Result<StoredSession, StorageError> {
        let mut take = |name: &str| {
            fields
                .remove(name)
                .ok_or_else(|| StorageError::Serde(format!("session hash is missing '{name}'")))
        };
        let user_id = take("user_id")?;
        let csrf_token = take("csrf_token")?;
        let expires_at = DateTime::parse_from_rfc3339(&take("expires_at")?)
            .map_err(|e| StorageError::Serde(e.to_string()))?
            .with_timezone(&Utc);

        Ok(StoredSession {
            session_id: session_id.to_string(),
            user_id,
            csrf_token,
            expires_at,
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        // Verify the connection works
        let _conn = self.client.get_multiplexed_async_connection().await?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<StoredSession>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(session_id);
        let fields: HashMap<String, String> = conn.hgetall(&key).await?;

        if fields.is_empty() {
            return Ok(None);
        }
        Self::from_hash(session_id, fields).map(Some)
    }

    async fn create(&self, session: &StoredSession) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(&session.session_id);
        let created: i64 = CREATE_SCRIPT
            .key(&key)
            .arg(&session.user_id)
            .arg(&session.csrf_token)
            .arg(session.expires_at.to_rfc3339())
            .arg(session.expires_at.timestamp())
            .invoke_async(&mut conn)
            .await?;

        if created == 1 {
            Ok(())
        } else {
            Err(StorageError::Conflict(
                "session id already exists".to_string(),
            ))
        }
    }

    async fn update_expiration(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(session_id);
        let updated: i64 = UPDATE_EXPIRATION_SCRIPT
            .key(&key)
            .arg(expires_at.to_rfc3339())
            .arg(expires_at.timestamp())
            .invoke_async(&mut conn)
            .await?;

        Ok(updated == 1)
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(session_id);
        let removed: i64 = conn.del(&key).await?;
        Ok(removed > 0)
    }

    async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<u64, StorageError> {
        // Keys carry EXPIREAT, Redis evicts them itself
        Ok(0)
    }
}
