mod manager;
mod policy;
mod scope;


pub use manager::{SessionManager, SessionManagerBuilder};
pub use policy::should_refresh;
pub use scope::SessionScope;
