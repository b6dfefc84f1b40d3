//! Session store selection and table configuration

use std::env;
use std::sync::{Arc, LazyLock};

use super::errors::StorageError;
use super::session_store::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SessionStore,
    SqliteSessionStore,
};

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "sl_".to_string()));

/// Sessions table name
pub(crate) static DB_TABLE_SESSIONS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_SESSIONS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "sessions"))
});

static SESSION_STORE_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("SESSION_STORE_TYPE").unwrap_or_else(|_| "memory".to_string()));

static SESSION_STORE_URL: LazyLock<String> =
    LazyLock::new(|| env::var("SESSION_STORE_URL").unwrap_or_default());

/// Build the store named by `store_type` without connecting to it
pub(crate) fn build_session_store(
    store_type: &str,
    store_url: &str,
) -> Result<Arc<dyn SessionStore>, StorageError> {
    let store: Arc<dyn SessionStore> = match store_type {
        "memory" => Arc::new(InMemorySessionStore::new()),
        "redis" => Arc::new(RedisSessionStore::new(store_url)?),
        "sqlite" => Arc::new(SqliteSessionStore::new(store_url)?),
        "postgres" => Arc::new(PostgresSessionStore::new(store_url)?),
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported session store type: {t}. Supported types are 'memory', 'redis', 'sqlite' and 'postgres'"
            )));
        }
    };
    Ok(store)
}

/// Build and initialize the store configured by `SESSION_STORE_TYPE` and `SESSION_STORE_URL`
pub async fn session_store_from_env() -> Result<Arc<dyn SessionStore>, StorageError> {
    let store_type = SESSION_STORE_TYPE.as_str();

    tracing::info!(store_type, "Initializing session store");

    let store = build_session_store(store_type, SESSION_STORE_URL.as_str())?;
    store.init().await.inspect_err(|e| {
        tracing::error!(store_type, error = %e, "Failed to initialize session store");
    })?;

    tracing::info!(store_type, "Connected to session store");
    Ok(store)
}
