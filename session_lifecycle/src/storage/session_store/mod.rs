mod memory;
mod postgres;
mod redis;
mod sqlite;
mod types;

pub use types::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SessionStore,
    SqliteSessionStore,
};
