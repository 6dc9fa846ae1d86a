//! Application wiring: one token store, one provider, one guard per console.

use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::net::api::{AuthApi, HttpAuthApi, build_http_client};
use crate::net::client::ApiClient;
use crate::net::types::ApiError;
use crate::routes::{GuardDecision, Navigator, RouteGuard};
use crate::session::AuthProvider;
use crate::state::redirect::{FileRedirectStore, RedirectStore};
use crate::state::token::TokenStore;

/// Everything a running console needs, built once at startup.
pub struct Console {
    pub auth: AuthProvider,
    pub guard: RouteGuard,
    pub client: ApiClient,
    navigator: Arc<dyn Navigator>,
}

impl Console {
    /// Wire the console against the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the HTTP client cannot be built.
    pub fn from_config(config: &ConsoleConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let http = build_http_client(config)?;
        let api: Arc<dyn AuthApi> = Arc::new(HttpAuthApi::new(http.clone(), config.api_base_url.clone()));
        let redirects = Arc::new(FileRedirectStore::new(&config.state_dir, config.redirect_ttl_secs));
        Ok(Self::assemble(config, api, http, redirects, navigator))
    }

    pub(crate) fn assemble(
        config: &ConsoleConfig,
        api: Arc<dyn AuthApi>,
        http: reqwest::Client,
        redirects: Arc<dyn RedirectStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth = AuthProvider::new(api, TokenStore::new(), Arc::clone(&navigator));
        let client = ApiClient::new(http, config.api_base_url.clone(), auth.refresher().clone());
        let guard = RouteGuard::new(redirects, config.login_path.clone()).with_public_paths(config.public_paths.clone());
        Self { auth, guard, client, navigator }
    }

    /// Resolve the session (first call only) and guard a navigation to `path`.
    pub async fn visit(&self, path: &str) -> GuardDecision {
        let state = self.auth.mount().await;
        self.guard.apply(&state, path, self.navigator.as_ref())
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
