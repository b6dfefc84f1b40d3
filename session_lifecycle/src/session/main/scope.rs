use tokio::task::JoinHandle;

use crate::session::types::{CsrfToken, Session, SessionId, UserId};

/// Session state of one unit of work (typically one request).
///
/// Holds at most one loaded session. Create one per request and pass it to every
/// [`SessionManager`](super::SessionManager) call; never share it between
/// concurrent requests.
#[derive(Debug, Default)]
pub struct SessionScope {
    session: Option<Session>,
    pending_refresh: Option<JoinHandle<()>>,
}

impl SessionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(|s| &s.session_id)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.session.as_ref().map(|s| &s.user_id)
    }

    /// CSRF token of the loaded session, or `None` if nothing is loaded
    pub fn csrf_token(&self) -> Option<&CsrfToken> {
        self.session.as_ref().map(|s| &s.csrf_token)
    }

    /// Wait for a background expiration refresh started by this scope, if any.
    ///
    /// Refresh failures were already logged; nothing is reported here.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.pending_refresh.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Background session refresh did not complete");
            }
        }
    }

    pub(super) fn load(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub(super) fn clear(&mut self) {
        self.session = None;
    }

    pub(super) fn track_refresh(&mut self, handle: JoinHandle<()>) {
        self.pending_refresh = Some(handle);
    }
}
