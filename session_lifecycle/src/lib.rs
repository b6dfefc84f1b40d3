//! session_lifecycle - Server-side session lifecycle library
//!
//! This crate binds opaque session identifiers to authenticated user identities,
//! applies a sliding expiration with a throttled refresh, and issues a CSRF token
//! bound to every session. Credential verification, cookies and routing are left
//! to the caller.
//!
//! A [`SessionManager`] is shared across requests; each unit of work owns its own
//! [`SessionScope`] which holds at most one loaded session.

mod config;
mod session;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{
    DEFAULT_REFRESH_WINDOW_SECS, DEFAULT_SESSION_LIFETIME_SECS, DEFAULT_TOKEN_LENGTH,
    MIN_TOKEN_LENGTH, RefreshMode, SessionConfig,
};

pub use session::{
    Clock, CsrfToken, ManualClock, SecureTokenGenerator, Session, SessionError, SessionId,
    SessionManager, SessionManagerBuilder, SessionScope, SystemClock, TokenGenerator, UserId,
    should_refresh,
};

pub use storage::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SessionStore,
    SqliteSessionStore, StorageError, StoredSession, session_store_from_env,
};

pub use utils::UtilError;

/// Build a [`SessionManager`] from environment configuration.
///
/// The store backend is chosen by `SESSION_STORE_TYPE`/`SESSION_STORE_URL` and
/// initialized before the manager is returned.
pub async fn init() -> Result<SessionManager, SessionError> {
    let config = SessionConfig::from_env()?;
    let store = session_store_from_env().await?;
    SessionManager::builder(store).config(config).build()
}
