//! Durable storage for the post-login redirect intent.
//!
//! DESIGN
//! ======
//! Two-phase protocol around one fixed key. Phase one (`save`) runs when the
//! route guard turns an unauthenticated visitor away; phase two (`take`) runs
//! once the visitor comes back authenticated and reads-and-deletes the key.
//! The intent must survive the full page reload of the OAuth round trip, so
//! the default store is a small JSON file rather than memory.
//!
//! TRADE-OFFS
//! ==========
//! An abandoned login leaves its intent behind. With a TTL configured, intents
//! older than the TTL are discarded on `take`; without one they live until the
//! next successful login consumes them.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::unix_now;

/// Storage key (file stem) holding the pending redirect path.
pub const REDIRECT_INTENT_KEY: &str = "redirect_intent";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redirect storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("redirect intent encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectIntent {
    /// Path plus query string.
    pub path: String,
    /// Unix seconds.
    pub saved_at: u64,
}

pub trait RedirectStore: Send + Sync {
    /// Persist `path` as the pending intent, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the intent cannot be written.
    fn save(&self, path: &str) -> Result<(), StorageError>;

    /// Read and delete the pending intent.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the intent cannot be read or removed.
    fn take(&self) -> Result<Option<String>, StorageError>;
}

fn fresh(intent: RedirectIntent, ttl_secs: Option<u64>, now: u64) -> Option<String> {
    match ttl_secs {
        Some(ttl) if now.saturating_sub(intent.saved_at) > ttl => {
            debug!(path = %intent.path, saved_at = intent.saved_at, "discarding stale redirect intent");
            None
        }
        _ => Some(intent.path),
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON file at `<dir>/redirect_intent.json`.
#[derive(Debug, Clone)]
pub struct FileRedirectStore {
    path: PathBuf,
    ttl_secs: Option<u64>,
}

impl FileRedirectStore {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, ttl_secs: Option<u64>) -> Self {
        Self { path: dir.as_ref().join(format!("{REDIRECT_INTENT_KEY}.json")), ttl_secs }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn take_at(&self, now: u64) -> Result<Option<String>, StorageError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        std::fs::remove_file(&self.path)?;

        match serde_json::from_slice::<RedirectIntent>(&raw) {
            Ok(intent) => Ok(fresh(intent, self.ttl_secs, now)),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "dropping unreadable redirect intent");
                Ok(None)
            }
        }
    }
}

impl RedirectStore for FileRedirectStore {
    fn save(&self, path: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let intent = RedirectIntent { path: path.to_owned(), saved_at: unix_now() };
        std::fs::write(&self.path, serde_json::to_vec(&intent)?)?;
        Ok(())
    }

    fn take(&self) -> Result<Option<String>, StorageError> {
        self.take_at(unix_now())
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryRedirectStore {
    slot: Mutex<Option<RedirectIntent>>,
    ttl_secs: Option<u64>,
}

impl MemoryRedirectStore {
    #[must_use]
    pub fn new(ttl_secs: Option<u64>) -> Self {
        Self { slot: Mutex::new(None), ttl_secs }
    }

    /// Current intent without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|intent| intent.path.clone())
    }

    fn take_at(&self, now: u64) -> Option<String> {
        let intent = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        fresh(intent, self.ttl_secs, now)
    }
}

impl RedirectStore for MemoryRedirectStore {
    fn save(&self, path: &str) -> Result<(), StorageError> {
        let intent = RedirectIntent { path: path.to_owned(), saved_at: unix_now() };
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(intent);
        Ok(())
    }

    fn take(&self) -> Result<Option<String>, StorageError> {
        Ok(self.take_at(unix_now()))
    }
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
