//! In-memory access-token holder for one running console instance.
//!
//! DESIGN
//! ======
//! The token lives only in memory: never written to disk, never placed in a
//! cookie. `TokenStore` is a cheap cloneable handle; every clone shares the
//! same slot, so the refresher, the session gate and the API client all see
//! one token without a process-wide global.
//!
//! ERROR HANDLING
//! ==============
//! `decode` never panics. A missing token and a malformed one are distinct
//! `DecodeError` variants; callers decide how each maps to session state.

use std::sync::{Arc, PoisonError, RwLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("no access token stored")]
    Missing,
    #[error("malformed access token: {0}")]
    Malformed(String),
}

// =============================================================================
// CLAIMS
// =============================================================================

/// Principal carried in the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Some issuers put the expiry inside the subject instead of the claims root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Decoded token payload: the subject object plus its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(alias = "user")]
    pub pld: Subject,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl TokenClaims {
    /// Expiry in Unix seconds, preferring the root `exp` claim.
    #[must_use]
    pub fn expires_at(&self) -> Option<u64> {
        self.exp.or(self.pld.exp)
    }

    /// A token is expired when its expiry is strictly before `now`.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at().is_none_or(|exp| exp < now)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Parse the payload segment of a `header.payload.signature` token.
///
/// The signature is not verified; the backend does that on every request.
///
/// # Errors
///
/// Returns `DecodeError::Malformed` if the token does not have three
/// segments, the payload is not base64url JSON of the expected shape, or no
/// expiry is present.
pub fn decode_token(token: &str) -> Result<TokenClaims, DecodeError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(DecodeError::Malformed("expected three segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| DecodeError::Malformed(format!("payload is not base64url: {e}")))?;
    let claims: TokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Malformed(format!("payload shape: {e}")))?;

    if claims.expires_at().is_none() {
        return Err(DecodeError::Malformed("missing exp claim".into()));
    }
    Ok(claims)
}

// =============================================================================
// TOKEN STORE
// =============================================================================

#[derive(Debug, Default)]
struct TokenSlot {
    token: Option<String>,
    /// Bumped on every clear; writers that started earlier lose their write.
    epoch: u64,
}

#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<TokenSlot>>,
}

impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    /// Replace the current token. An empty string clears the store.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if token.is_empty() {
            slot.token = None;
            slot.epoch += 1;
        } else {
            slot.token = Some(token);
        }
    }

    pub fn clear(&self) {
        self.set("");
    }

    /// Invalidation generation; changes every time the store is cleared.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).epoch
    }

    /// Store `token` only if the store has not been cleared since `epoch`.
    ///
    /// Returns `false` when the write was dropped.
    pub fn set_if_epoch(&self, token: &str, epoch: u64) -> bool {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if slot.epoch != epoch || token.is_empty() {
            return false;
        }
        slot.token = Some(token.to_owned());
        true
    }

    /// Decode the stored token's payload.
    ///
    /// # Errors
    ///
    /// `DecodeError::Missing` when the store is empty, `DecodeError::Malformed`
    /// when the stored token cannot be parsed.
    pub fn decode(&self) -> Result<TokenClaims, DecodeError> {
        let token = self.get().ok_or(DecodeError::Missing)?;
        decode_token(&token)
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
