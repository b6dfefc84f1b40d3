use chrono::{DateTime, Duration, Utc};

use crate::config::SessionConfig;
use crate::session::errors::SessionError;

/// Longest session ID accepted from a client before the store is consulted
pub(super) const MAX_SESSION_ID_LEN: usize = 512;

/// Decide whether a validation at `now` should push the expiration forward.
///
/// Every create and every refresh sets `expires_at` to exactly `set_at + lifetime`,
/// so `expires_at < now + lifetime - refresh_window` holds precisely when at least
/// `refresh_window` has passed since the expiration was last written. The
/// comparison is strict: at exactly one window after the last write, no refresh.
pub fn should_refresh(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &SessionConfig,
) -> bool {
    let threshold = now
        .checked_add_signed(config.lifetime)
        .and_then(|t| t.checked_sub_signed(config.refresh_window));

    match threshold {
        Some(threshold) => expires_at < threshold,
        None => false,
    }
}

/// Absolute expiration for a session written at `now`
pub(super) fn expiry_from(
    now: DateTime<Utc>,
    lifetime: Duration,
) -> Result<DateTime<Utc>, SessionError> {
    now.checked_add_signed(lifetime).ok_or_else(|| {
        SessionError::Config("session lifetime overflows the timestamp range".to_string())
    })
}

/// Cheap screen for client-supplied IDs; generated IDs always pass.
pub(super) fn is_well_formed_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
