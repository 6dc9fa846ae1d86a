//! Session context for the console.
//!
//! ARCHITECTURE
//! ============
//! `AuthProvider` is constructed once at application start and shared by
//! everything that needs identity. It owns the observable `AuthState`
//! (a tokio `watch` channel), resolves the session exactly once on mount,
//! and afterwards changes state only through explicit login/logout calls.

use std::convert::Infallible;
use std::sync::Arc;

use tokio::sync::{OnceCell, watch};
use tracing::{info, warn};

use super::gate::AuthSessionGate;
use super::refresher::SessionRefresher;
use crate::net::api::AuthApi;
use crate::routes::Navigator;
use crate::state::auth::AuthState;
use crate::state::token::TokenStore;
use crate::state::unix_now;

pub struct AuthProvider {
    api: Arc<dyn AuthApi>,
    tokens: TokenStore,
    refresher: SessionRefresher,
    gate: AuthSessionGate,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthState>,
    mounted: OnceCell<()>,
}

impl AuthProvider {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        let refresher = SessionRefresher::new(Arc::clone(&api), tokens.clone());
        let gate = AuthSessionGate::new(refresher.clone());
        let (state, _) = watch::channel(AuthState::loading());
        Self { api, tokens, refresher, gate, navigator, state, mounted: OnceCell::new() }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Refresher sharing this provider's single-flight slot.
    #[must_use]
    pub fn refresher(&self) -> &SessionRefresher {
        &self.refresher
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Resolve the session on first mount; later calls return current state.
    pub async fn mount(&self) -> AuthState {
        self.mounted
            .get_or_init(|| async {
                let resolved = self.gate.resolve().await;
                self.state.send_replace(resolved);
            })
            .await;
        self.state()
    }

    /// Navigate the page to the provider's login endpoint.
    ///
    /// The page unloads, so this never completes; the session resumes on the
    /// next mount after the backend redirects back.
    pub async fn login(&self, provider: &str) -> Infallible {
        let url = self.api.login_url(provider);
        info!(%provider, %url, "starting login redirect");
        self.navigator.assign(&url);
        std::future::pending().await
    }

    /// Adopt a token delivered by a login callback.
    pub fn complete_login(&self, token: &str) -> AuthState {
        self.tokens.set(token);
        let next = match self.gate.current_user(unix_now()) {
            Ok(user) => {
                info!(user_id = %user.id, "login completed");
                AuthState::authenticated(user)
            }
            Err(e) => {
                warn!(error = %e, "rejecting login token");
                self.tokens.clear();
                AuthState::unauthenticated()
            }
        };
        self.state.send_replace(next.clone());
        next
    }

    /// End the session locally; a failing backend logout is logged only.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "backend logout failed");
        }
        self.tokens.clear();
        self.state.send_replace(AuthState::unauthenticated());
        info!("logged out");
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
