//! Shared fixtures for unit tests: token minting and a scripted auth backend.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header};
use tokio::sync::Notify;

use crate::net::api::AuthApi;
use crate::net::types::ApiError;
use crate::routes::{NavigateOptions, Navigator};
use crate::state::token::Subject;

pub fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

/// Subject with an id and an optional `identifier`.
pub fn subject(id: &str, identifier: Option<&str>) -> Subject {
    Subject {
        id: id.to_owned(),
        identifier: identifier.map(str::to_owned),
        display_name: None,
        first_name: None,
        last_name: None,
        email: None,
        exp: None,
    }
}

/// HS256-signed token carrying `subject` under `pld`.
pub fn mint_token(subject: &Subject, exp: u64) -> String {
    let claims = serde_json::json!({ "pld": subject, "exp": exp });
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

// =============================================================================
// MockAuthApi
// =============================================================================

/// Scripted `AuthApi`: pops queued refresh outcomes and counts calls.
///
/// When `hold` is set, every refresh waits on `release` before answering.
pub struct MockAuthApi {
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    outcomes: Mutex<Vec<Result<String, ApiError>>>,
    logout_outcome: Result<(), ApiError>,
    hold: bool,
    pub release: Notify,
}

impl MockAuthApi {
    pub fn new(outcomes: Vec<Result<String, ApiError>>) -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            outcomes: Mutex::new(outcomes),
            logout_outcome: Ok(()),
            hold: false,
            release: Notify::new(),
        }
    }

    pub fn held(outcomes: Vec<Result<String, ApiError>>) -> Self {
        Self { hold: true, ..Self::new(outcomes) }
    }

    pub fn failing_logout(mut self) -> Self {
        self.logout_outcome = Err(ApiError::Request("connection refused".into()));
        self
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthApi for MockAuthApi {
    async fn refresh(&self) -> Result<String, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold {
            self.release.notified().await;
        }
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            Err(ApiError::Status { status: 401, body: String::new() })
        } else {
            outcomes.remove(0)
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logout_outcome.clone()
    }

    fn login_url(&self, provider: &str) -> String {
        format!("http://backend.test/api/auth/{provider}/login")
    }
}

// =============================================================================
// RecordingNavigator
// =============================================================================

/// Navigator that records every call instead of touching a browser.
#[derive(Default)]
pub struct RecordingNavigator {
    pub navigations: Mutex<Vec<(String, NavigateOptions)>>,
    pub assignments: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, to: &str, options: NavigateOptions) {
        self.navigations.lock().unwrap().push((to.to_owned(), options));
    }

    fn assign(&self, url: &str) {
        self.assignments.lock().unwrap().push(url.to_owned());
    }
}

// =============================================================================
// Fake backend
// =============================================================================

/// Serve `app` on an ephemeral local port, returning its base URL.
pub async fn spawn_backend(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
