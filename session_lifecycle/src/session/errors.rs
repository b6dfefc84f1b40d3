use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

/// Failures of the session lifecycle.
///
/// A missing or expired session is not an error; it is reported as `None`/`false`
/// by the manager. Every variant here must be rendered as "not authenticated" at
/// the request boundary so callers cannot probe for session existence.
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The session store failed to answer; the session's state is unknown
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// Two consecutive generated session IDs collided with existing records
    #[error("Session ID collided twice; token source may be broken")]
    TokenConflict,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid session configuration: {0}")]
    Config(String),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Config(msg) => Self::Config(msg),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<UtilError> for SessionError {
    fn from(err: UtilError) -> Self {
        Self::TokenGeneration(err.to_string())
    }
}
