mod clock;
mod errors;
mod main;
mod token;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::SessionError;
pub use main::{SessionManager, SessionManagerBuilder, SessionScope, should_refresh};
pub use token::{SecureTokenGenerator, TokenGenerator};
pub use types::{CsrfToken, Session, SessionId, UserId};
