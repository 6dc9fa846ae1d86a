//! Authentication session core: single-flight refresh, session gate, provider.

pub mod gate;
pub mod provider;
pub mod refresher;

pub use gate::AuthSessionGate;
pub use provider::AuthProvider;
pub use refresher::{RefreshError, SessionRefresher};
