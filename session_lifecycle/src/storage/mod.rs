mod config;
mod errors;
mod session_store;
mod types;

pub use config::session_store_from_env;
pub use errors::StorageError;
pub use session_store::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SessionStore,
    SqliteSessionStore,
};
pub use types::StoredSession;
