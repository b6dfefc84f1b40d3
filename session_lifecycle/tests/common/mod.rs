use std::sync::{Arc, Once};

use chrono::{DateTime, Utc};
use session_lifecycle::{
    ManualClock, RefreshMode, SessionConfig, SessionManager, SessionStore,
};

/// Load `.env_test` (falling back to `.env`) once per test binary
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000, 0).expect("valid timestamp")
}

/// Manager over `store` driven by a manual clock, refreshing inline
pub fn manager_with_clock(store: Arc<dyn SessionStore>) -> (SessionManager, Arc<ManualClock>) {
    init_test_environment();
    let clock = Arc::new(ManualClock::new(start_time()));
    let manager = SessionManager::builder(store)
        .config(SessionConfig::default().with_refresh_mode(RefreshMode::Inline))
        .clock(clock.clone())
        .build()
        .expect("valid configuration");
    (manager, clock)
}
