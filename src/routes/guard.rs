//! Protected-route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation into the protected part of the route tree passes through
//! `RouteGuard::apply`. Unauthenticated visitors are sent to the login page
//! with their destination remembered; once they come back authenticated the
//! remembered destination is consumed and replayed exactly once.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{NavigateOptions, Navigator};
use crate::state::auth::{AuthState, SessionStatus};
use crate::state::redirect::RedirectStore;

/// Outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; show a placeholder.
    Placeholder,
    /// Render the requested subtree.
    Render,
    /// Authenticated with a remembered destination; replace history with it.
    Resume { path: String },
    /// Not authenticated; send the visitor to login.
    RedirectToLogin { location: String },
}

pub struct RouteGuard {
    redirects: Arc<dyn RedirectStore>,
    login_path: String,
    public_paths: Vec<String>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(redirects: Arc<dyn RedirectStore>, login_path: impl Into<String>) -> Self {
        Self { redirects, login_path: login_path.into(), public_paths: Vec::new() }
    }

    /// Additional path prefixes that never require a session, matched on
    /// whole segments.
    #[must_use]
    pub fn with_public_paths(mut self, public_paths: Vec<String>) -> Self {
        self.public_paths = public_paths;
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    fn is_public(&self, requested: &str) -> bool {
        let path = requested.split(['?', '#']).next().unwrap_or_default();
        path == self.login_path || self.public_paths.iter().any(|prefix| under_prefix(path, prefix))
    }

    /// Login location carrying `requested` as the `redirect` query parameter.
    #[must_use]
    pub fn login_location(&self, requested: &str) -> String {
        format!("{}?redirect={}", self.login_path, urlencoding::encode(requested))
    }

    /// Decide what to do with a navigation to `requested` (path plus query).
    ///
    /// Consumes or records the redirect intent as a side effect.
    pub fn decide(&self, auth: &AuthState, requested: &str) -> GuardDecision {
        if self.is_public(requested) {
            return GuardDecision::Render;
        }

        match auth.status() {
            SessionStatus::Loading => GuardDecision::Placeholder,
            SessionStatus::Authenticated => match self.redirects.take() {
                Ok(Some(path)) if path != requested => {
                    info!(%path, "resuming navigation after login");
                    GuardDecision::Resume { path }
                }
                Ok(_) => GuardDecision::Render,
                Err(e) => {
                    warn!(error = %e, "could not read redirect intent");
                    GuardDecision::Render
                }
            },
            SessionStatus::Unauthenticated => {
                if let Err(e) = self.redirects.save(requested) {
                    warn!(error = %e, path = %requested, "could not persist redirect intent");
                }
                let location = self.login_location(requested);
                debug!(%location, "redirecting unauthenticated visitor to login");
                GuardDecision::RedirectToLogin { location }
            }
        }
    }

    /// `decide`, then perform the resulting navigation.
    pub fn apply(&self, auth: &AuthState, requested: &str, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.decide(auth, requested);
        match &decision {
            GuardDecision::Resume { path } => navigator.navigate(path, NavigateOptions { replace: true }),
            GuardDecision::RedirectToLogin { location } => navigator.navigate(location, NavigateOptions::default()),
            GuardDecision::Placeholder | GuardDecision::Render => {}
        }
        decision
    }
}

/// `true` when `path` is `prefix` itself or lies below it on a segment boundary.
fn under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
