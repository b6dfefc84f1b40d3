//! Central configuration for the session_lifecycle crate

use std::env;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::Duration;

use crate::session::SessionError;

/// Default session lifetime: two weeks
pub const DEFAULT_SESSION_LIFETIME_SECS: i64 = 14 * 24 * 60 * 60;

/// Default refresh throttle window: one day
pub const DEFAULT_REFRESH_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Default number of random bytes in a session ID or CSRF token (256 bits)
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Lowest accepted token length in bytes (128 bits)
pub const MIN_TOKEN_LENGTH: usize = 16;

pub(crate) static SESSION_LIFETIME_SECS: LazyLock<i64> =
    LazyLock::new(|| parse_env_or("SESSION_LIFETIME_SECS", DEFAULT_SESSION_LIFETIME_SECS));

pub(crate) static SESSION_REFRESH_WINDOW_SECS: LazyLock<i64> = LazyLock::new(|| {
    parse_env_or("SESSION_REFRESH_WINDOW_SECS", DEFAULT_REFRESH_WINDOW_SECS)
});

pub(crate) static SESSION_TOKEN_LENGTH: LazyLock<usize> =
    LazyLock::new(|| parse_env_or("SESSION_TOKEN_LENGTH", DEFAULT_TOKEN_LENGTH));

pub(crate) static SESSION_REFRESH_MODE: LazyLock<RefreshMode> =
    LazyLock::new(|| parse_env_or("SESSION_REFRESH_MODE", RefreshMode::Background));

fn parse_env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparseable setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn seconds(key: &str, secs: i64) -> Result<Duration, SessionError> {
    Duration::try_seconds(secs)
        .ok_or_else(|| SessionError::Config(format!("{key}={secs} is out of range")))
}

/// How the expiration refresh triggered by a validation is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Spawn the store write on the tokio runtime and return immediately
    #[default]
    Background,
    /// Await the store write before returning; failures are still only logged
    Inline,
}

impl FromStr for RefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "inline" => Ok(Self::Inline),
            other => Err(format!("unknown refresh mode: {other}")),
        }
    }
}

/// Tunables of the session lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Total lifetime `T` granted at creation and at every refresh
    pub lifetime: Duration,
    /// Minimum time between two refreshes of the same session
    pub refresh_window: Duration,
    /// Random bytes drawn for each session ID and CSRF token
    pub token_length: usize,
    pub refresh_mode: RefreshMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::seconds(DEFAULT_SESSION_LIFETIME_SECS),
            refresh_window: Duration::seconds(DEFAULT_REFRESH_WINDOW_SECS),
            token_length: DEFAULT_TOKEN_LENGTH,
            refresh_mode: RefreshMode::Background,
        }
    }
}

impl SessionConfig {
    /// Read the configuration from `SESSION_*` environment variables.
    ///
    /// Missing or unparseable values fall back to the defaults; the result is validated.
    pub fn from_env() -> Result<Self, SessionError> {
        let config = Self {
            lifetime: seconds("SESSION_LIFETIME_SECS", *SESSION_LIFETIME_SECS)?,
            refresh_window: seconds(
                "SESSION_REFRESH_WINDOW_SECS",
                *SESSION_REFRESH_WINDOW_SECS,
            )?,
            token_length: *SESSION_TOKEN_LENGTH,
            refresh_mode: *SESSION_REFRESH_MODE,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_refresh_window(mut self, refresh_window: Duration) -> Self {
        self.refresh_window = refresh_window;
        self
    }

    pub fn with_token_length(mut self, token_length: usize) -> Self {
        self.token_length = token_length;
        self
    }

    pub fn with_refresh_mode(mut self, refresh_mode: RefreshMode) -> Self {
        self.refresh_mode = refresh_mode;
        self
    }

    /// Reject settings that would break the refresh policy or weaken the tokens
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.lifetime <= Duration::zero() {
            return Err(SessionError::Config(
                "session lifetime must be positive".to_string(),
            ));
        }
        if self.refresh_window < Duration::zero() {
            return Err(SessionError::Config(
                "refresh window must not be negative".to_string(),
            ));
        }
        if self.refresh_window >= self.lifetime {
            return Err(SessionError::Config(format!(
                "refresh window ({}s) must be shorter than the session lifetime ({}s)",
                self.refresh_window.num_seconds(),
                self.lifetime.num_seconds()
            )));
        }
        if self.token_length < MIN_TOKEN_LENGTH {
            return Err(SessionError::Config(format!(
                "token length {} is below the minimum of {MIN_TOKEN_LENGTH} bytes",
                self.token_length
            )));
        }
        Ok(())
    }
}
