//! Per-navigation session resolution.
//!
//! Decode the held token; refresh once if it is missing, unreadable or
//! expired; then project whatever token is held into a `SessionUser`.
//! Every failure mode maps to an unauthenticated state here, explicitly,
//! and a token that cannot be used is cleared so it is not retried.

use tracing::{debug, info, warn};

use super::refresher::SessionRefresher;
use crate::state::auth::{AuthState, SessionUser};
use crate::state::unix_now;
use crate::state::token::{DecodeError, TokenStore};

#[derive(Clone)]
pub struct AuthSessionGate {
    tokens: TokenStore,
    refresher: SessionRefresher,
}

impl AuthSessionGate {
    #[must_use]
    pub fn new(refresher: SessionRefresher) -> Self {
        Self { tokens: refresher.tokens().clone(), refresher }
    }

    pub async fn resolve(&self) -> AuthState {
        self.resolve_at(unix_now()).await
    }

    /// Internal: resolve against an explicit clock (for testing).
    pub(crate) async fn resolve_at(&self, now: u64) -> AuthState {
        let needs_refresh = match self.tokens.decode() {
            Ok(claims) if claims.is_expired(now) => {
                debug!(exp = ?claims.expires_at(), now, "access token expired");
                true
            }
            Ok(claims) => match SessionUser::try_from(&claims.pld) {
                Ok(_) => false,
                Err(e) => {
                    warn!(error = %e, "clearing access token with unusable subject");
                    self.tokens.clear();
                    true
                }
            },
            Err(DecodeError::Missing) => {
                debug!("no access token held");
                true
            }
            Err(e) => {
                warn!(error = %e, "clearing unreadable access token");
                self.tokens.clear();
                true
            }
        };

        if needs_refresh {
            if let Err(e) = self.refresher.refresh().await {
                debug!(error = %e, "refresh did not produce a token");
            }
        }

        match self.current_user(now) {
            Ok(user) => {
                info!(user_id = %user.id, "session authenticated");
                AuthState::authenticated(user)
            }
            Err(DecodeError::Missing) => AuthState::unauthenticated(),
            Err(e) => {
                warn!(error = %e, "discarding unusable access token");
                self.tokens.clear();
                AuthState::unauthenticated()
            }
        }
    }

    /// Project the held token into a user without refreshing.
    pub(crate) fn current_user(&self, now: u64) -> Result<SessionUser, DecodeError> {
        let claims = self.tokens.decode()?;
        if claims.is_expired(now) {
            return Err(DecodeError::Malformed("token expired".into()));
        }
        SessionUser::try_from(&claims.pld)
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
