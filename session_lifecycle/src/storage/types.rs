use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session record as persisted by a [`SessionStore`](super::SessionStore)
///
/// All four fields are written together; stores never persist a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredSession {
    pub session_id: String,
    pub user_id: String,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
