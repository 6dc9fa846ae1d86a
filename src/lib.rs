//! InfraKitchen console session core.
//!
//! Token store, single-flight refresh, session gate and protected-route guard
//! for the InfraKitchen administration console, plus the thin REST client the
//! console pages use.

pub mod app;
pub mod config;
pub mod net;
pub mod routes;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_helpers;

pub use app::Console;
pub use config::{ConfigError, ConsoleConfig};
pub use net::api::{AuthApi, HttpAuthApi};
pub use net::client::ApiClient;
pub use net::types::ApiError;
pub use routes::{GuardDecision, NavigateOptions, Navigator, RouteGuard};
pub use session::{AuthProvider, AuthSessionGate, RefreshError, SessionRefresher};
pub use state::auth::{AuthState, SessionStatus, SessionUser};
pub use state::redirect::{FileRedirectStore, MemoryRedirectStore, RedirectStore, StorageError};
pub use state::token::{DecodeError, TokenClaims, TokenStore};
