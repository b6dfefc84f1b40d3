use std::sync::Arc;

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::Instrument;

use crate::config::{RefreshMode, SessionConfig};
use crate::session::clock::{Clock, SystemClock};
use crate::session::errors::SessionError;
use crate::session::token::{SecureTokenGenerator, TokenGenerator};
use crate::session::types::{CsrfToken, Session, SessionId, UserId};
use crate::storage::{SessionStore, StorageError, StoredSession};
use crate::utils::redact_id;

use super::policy::{expiry_from, is_well_formed_session_id, should_refresh};
use super::scope::SessionScope;

/// A freshly generated ID may collide once; a second collision is fatal
const CREATE_ATTEMPTS: usize = 2;

/// Applies the session lifecycle policy against a [`SessionStore`].
///
/// The manager holds no per-request state and is cheap to clone; request state
/// lives in the [`SessionScope`] passed to each call.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

pub struct SessionManagerBuilder {
    store: Arc<dyn SessionStore>,
    tokens: Option<Arc<dyn TokenGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    config: SessionConfig,
}

impl SessionManagerBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and assemble the manager
    pub fn build(self) -> Result<SessionManager, SessionError> {
        self.config.validate()?;
        Ok(SessionManager {
            store: self.store,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(SecureTokenGenerator)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config,
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Start building a manager over `store` with the default configuration,
    /// the system CSPRNG and the wall clock
    pub fn builder(store: Arc<dyn SessionStore>) -> SessionManagerBuilder {
        SessionManagerBuilder {
            store,
            tokens: None,
            clock: None,
            config: SessionConfig::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Look up `session_id` and load it into `scope`.
    ///
    /// Returns the session's user on success and `None` when the ID is unknown,
    /// malformed or expired. A store failure is an error, never `None`. When the
    /// refresh policy fires, the expiration is pushed to `now + lifetime`; a failed
    /// refresh is logged and does not affect the result.
    #[tracing::instrument(skip_all, fields(session = %redact_id(session_id)))]
    pub async fn validate(
        &self,
        scope: &mut SessionScope,
        session_id: &str,
    ) -> Result<Option<UserId>, SessionError> {
        scope.clear();

        if !is_well_formed_session_id(session_id) {
            tracing::debug!("Rejecting malformed session id");
            return Ok(None);
        }

        let stored = match self.store.get(session_id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!("No session found");
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                return Err(e.into());
            }
        };

        let now = self.clock.now();
        if stored.is_expired_at(now) {
            tracing::debug!(expires_at = %stored.expires_at, "Session expired");
            if let Err(e) = self.store.delete(session_id).await {
                tracing::warn!(error = %e, "Failed to reap expired session");
            }
            return Ok(None);
        }

        let session = Session::from(stored);
        if should_refresh(session.expires_at, now, &self.config) {
            self.refresh_expiration(scope, session_id, now).await;
        }

        let user_id = session.user_id.clone();
        tracing::debug!(user_id = %user_id, "Session validated");
        scope.load(session);
        Ok(Some(user_id))
    }

    async fn refresh_expiration(
        &self,
        scope: &mut SessionScope,
        session_id: &str,
        now: DateTime<Utc>,
    ) {
        let expires_at = match expiry_from(now, self.config.lifetime) {
            Ok(expires_at) => expires_at,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping session refresh");
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let session_id = session_id.to_string();
        let write = async move {
            match store.update_expiration(&session_id, expires_at).await {
                Ok(true) => tracing::debug!(%expires_at, "Session expiration refreshed"),
                Ok(false) => tracing::debug!("Session disappeared before refresh"),
                Err(e) => tracing::warn!(error = %e, "Failed to refresh session expiration"),
            }
        }
        .instrument(tracing::Span::current());

        match self.config.refresh_mode {
            RefreshMode::Inline => write.await,
            RefreshMode::Background => scope.track_refresh(tokio::spawn(write)),
        }
    }

    /// Mint a session for an already authenticated `user_id` and load it into `scope`.
    ///
    /// If `scope` already holds a session its ID is returned unchanged and nothing
    /// is written.
    #[tracing::instrument(skip(self, scope))]
    pub async fn create(
        &self,
        scope: &mut SessionScope,
        user_id: &str,
    ) -> Result<SessionId, SessionError> {
        if let Some(existing) = scope.session_id() {
            tracing::debug!("Session already loaded, not creating another");
            return Ok(existing.clone());
        }

        let expires_at = expiry_from(self.clock.now(), self.config.lifetime)?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let session_id = self.tokens.random(self.config.token_length)?;
            if !is_well_formed_session_id(&session_id) {
                tracing::error!("Token generator produced an unusable session id");
                return Err(SessionError::TokenGeneration(
                    "generated session id is outside the URL-safe alphabet".to_string(),
                ));
            }

            let session = Session {
                session_id: SessionId::new(session_id),
                user_id: UserId::new(user_id),
                csrf_token: CsrfToken::new(self.tokens.random(self.config.token_length)?),
                expires_at,
            };

            match self.store.create(&StoredSession::from(&session)).await {
                Ok(()) => {
                    let session_id = session.session_id.clone();
                    tracing::info!(
                        session = %redact_id(session_id.as_str()),
                        %expires_at,
                        "Session created"
                    );
                    scope.load(session);
                    return Ok(session_id);
                }
                Err(StorageError::Conflict(_)) if attempt < CREATE_ATTEMPTS => {
                    tracing::warn!(attempt, "Generated session id already exists, retrying");
                }
                Err(StorageError::Conflict(_)) => {
                    tracing::error!(attempt, "Generated session ids keep colliding");
                    return Err(SessionError::TokenConflict);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist new session");
                    return Err(e.into());
                }
            }
        }
    }

    /// Delete the session loaded in `scope`.
    ///
    /// Returns `false` without touching the store when nothing is loaded. On a
    /// store failure the scope keeps its session so the caller can retry.
    #[tracing::instrument(skip_all)]
    pub async fn remove(&self, scope: &mut SessionScope) -> Result<bool, SessionError> {
        let Some(session_id) = scope.session_id().cloned() else {
            return Ok(false);
        };

        match self.store.delete(session_id.as_str()).await {
            Ok(existed) => {
                tracing::debug!(
                    session = %redact_id(session_id.as_str()),
                    existed,
                    "Session removed"
                );
                scope.clear();
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to remove session");
                Err(e.into())
            }
        }
    }

    /// Delete every stored session whose expiration has passed.
    ///
    /// Validation only reaps the records it is asked about; hosts backed by a SQL
    /// store call this periodically to clear abandoned sessions.
    #[tracing::instrument(skip_all)]
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        let purged = self
            .store
            .delete_expired(self.clock.now())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to purge expired sessions"))?;
        tracing::info!(purged, "Purged expired sessions");
        Ok(purged)
    }

    /// CSRF token bound to the session loaded in `scope`
    pub fn current_csrf_token<'a>(&self, scope: &'a SessionScope) -> Option<&'a CsrfToken> {
        scope.csrf_token()
    }

    /// Compare a client-presented CSRF token with the loaded session's token in
    /// constant time. `false` when no session is loaded.
    pub fn verify_csrf_token(&self, scope: &SessionScope, presented: &str) -> bool {
        match scope.csrf_token() {
            Some(token) => token.as_str().as_bytes().ct_eq(presented.as_bytes()).into(),
            None => false,
        }
    }
}
