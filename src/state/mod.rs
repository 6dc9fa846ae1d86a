//! Client-side session state: token slot, auth state, redirect intent.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod auth;
pub mod redirect;
pub mod token;

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
