//! Auth-session state for the current console user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Produced by the session gate and published by the auth provider; read by
//! the route guard and identity-aware views.

use serde::Serialize;

use super::token::{DecodeError, Subject};

/// Signed-in principal, projected from the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub identifier: String,
    pub email: Option<String>,
}

impl TryFrom<&Subject> for SessionUser {
    type Error = DecodeError;

    /// `identifier` is `display_name`, else `identifier`, else the full name.
    fn try_from(subject: &Subject) -> Result<Self, Self::Error> {
        let identifier = subject
            .display_name
            .clone()
            .or_else(|| subject.identifier.clone())
            .or_else(|| full_name(subject))
            .ok_or_else(|| DecodeError::Malformed("subject has no identifier".into()))?;

        Ok(Self { id: subject.id.clone(), identifier, email: subject.email.clone() })
    }
}

fn full_name(subject: &Subject) -> Option<String> {
    match (subject.first_name.as_deref(), subject.last_name.as_deref()) {
        (None, None) => None,
        (first, last) => Some(format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default()).trim().to_owned()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl AuthState {
    /// State before the session has been resolved.
    #[must_use]
    pub fn loading() -> Self {
        Self { user: None, loading: true }
    }

    #[must_use]
    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user), loading: false }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { user: None, loading: false }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match (self.loading, &self.user) {
            (true, _) => SessionStatus::Loading,
            (false, Some(_)) => SessionStatus::Authenticated,
            (false, None) => SessionStatus::Unauthenticated,
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
