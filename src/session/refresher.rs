//! Single-flight access-token refresh.
//!
//! DESIGN
//! ======
//! The refresher is a two-state machine: `Idle` or `Pending` with a shared
//! handle to the in-flight result. The first caller that finds the slot idle
//! starts the network call and parks its shared result in the slot; every
//! caller arriving while it is pending clones that handle and awaits the same
//! outcome. The slot check and the transition to `Pending` happen under one
//! lock acquisition that is never held across an await, so two refreshes can
//! never be in flight at once on a multi-threaded runtime either.
//!
//! The network call runs on a spawned task. It settles even if every waiter
//! is dropped, and it returns the slot to `Idle` before handing its result to
//! waiters, so the next caller after settlement always starts fresh.
//!
//! A refresh only writes its token if the store has not been cleared since
//! the refresh started, so a logout during a pending refresh stays a logout.
//!
//! ERROR HANDLING
//! ==============
//! A failed refresh leaves the token store untouched: an earlier token is not
//! destroyed by a failed attempt. The error is returned, not thrown; callers
//! decide what it means for the session.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::net::api::AuthApi;
use crate::net::types::ApiError;
use crate::state::token::TokenStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("token refresh failed: {0}")]
    Api(#[from] ApiError),
    /// The refresh task panicked or was cancelled before settling.
    #[error("token refresh aborted: {0}")]
    Aborted(String),
    /// The session was cleared while the refresh was in flight.
    #[error("session cleared during token refresh")]
    Superseded,
}

type SharedRefresh = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

enum RefreshSlot {
    Idle,
    Pending { id: Uuid, result: SharedRefresh },
}

#[derive(Clone)]
pub struct SessionRefresher {
    api: Arc<dyn AuthApi>,
    tokens: TokenStore,
    slot: Arc<Mutex<RefreshSlot>>,
}

impl SessionRefresher {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        Self { api, tokens, slot: Arc::new(Mutex::new(RefreshSlot::Idle)) }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// `true` while a refresh is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(*self.slot.lock().unwrap_or_else(PoisonError::into_inner), RefreshSlot::Pending { .. })
    }

    /// Fetch a new access token, joining the in-flight refresh if there is one.
    ///
    /// On success the token is already in the token store when this returns.
    ///
    /// # Errors
    ///
    /// Returns a [`RefreshError`] if the backend call fails; every coalesced
    /// caller receives the same error.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let result = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match &*slot {
                RefreshSlot::Pending { id, result } => {
                    debug!(operation_id = %id, "joining in-flight token refresh");
                    result.clone()
                }
                RefreshSlot::Idle => {
                    let id = Uuid::new_v4();
                    let result = self.start(id);
                    *slot = RefreshSlot::Pending { id, result: result.clone() };
                    result
                }
            }
        };
        result.await
    }

    fn start(&self, id: Uuid) -> SharedRefresh {
        let api = Arc::clone(&self.api);
        let tokens = self.tokens.clone();
        let slot = Arc::clone(&self.slot);

        let epoch = tokens.epoch();

        debug!(operation_id = %id, epoch, "starting token refresh");
        let task = tokio::spawn(async move {
            let outcome = match api.refresh().await {
                Ok(token) if tokens.set_if_epoch(&token, epoch) => {
                    info!(operation_id = %id, "token refresh succeeded");
                    Ok(token)
                }
                Ok(_) => {
                    info!(operation_id = %id, "session cleared during refresh, dropping token");
                    Err(RefreshError::Superseded)
                }
                Err(e) => {
                    warn!(operation_id = %id, error = %e, "token refresh failed");
                    Err(RefreshError::from(e))
                }
            };
            settle(&slot, id);
            outcome
        });

        let slot = Arc::clone(&self.slot);
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    settle(&slot, id);
                    Err(RefreshError::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Return the slot to `Idle` if it still belongs to operation `id`.
fn settle(slot: &Mutex<RefreshSlot>, id: Uuid) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if matches!(&*slot, RefreshSlot::Pending { id: current, .. } if *current == id) {
        *slot = RefreshSlot::Idle;
    }
}

#[cfg(test)]
#[path = "refresher_test.rs"]
mod tests;
