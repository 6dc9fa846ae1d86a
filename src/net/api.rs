//! Auth endpoints of the InfraKitchen REST API.
//!
//! The refresh call rides on backend session cookies, so the underlying
//! `reqwest` client keeps a cookie store. Login and callback endpoints are
//! never fetched: the console only builds their URLs and navigates the page.

use std::time::Duration;

use tracing::debug;

use super::types::{ApiError, RefreshResponse};
use crate::config::ConsoleConfig;

/// Backend auth operations. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/refresh`, returning the new access token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails, the status is not 2xx,
    /// or the body has no `token`.
    async fn refresh(&self) -> Result<String, ApiError>;

    /// `GET /api/auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the status is not 2xx.
    async fn logout(&self) -> Result<(), ApiError>;

    /// Full-page login entry point for `provider`.
    fn login_url(&self, provider: &str) -> String;
}

/// Build the shared HTTP client with configured timeouts and a cookie jar.
///
/// # Errors
///
/// Returns `ApiError::Request` if the TLS backend cannot be initialized.
pub fn build_http_client(config: &ConsoleConfig) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ApiError::Request(format!("HTTP client build failed: {e}")))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), body })
}

pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// `{base_url}/api/auth/{provider}/login`.
    #[must_use]
    pub fn login_url_for(base_url: &str, provider: &str) -> String {
        endpoint(base_url, &format!("/api/auth/{}/login", urlencoding::encode(provider)))
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn refresh(&self) -> Result<String, ApiError> {
        let url = endpoint(&self.base_url, "/api/auth/refresh");
        debug!(%url, "requesting token refresh");
        let resp = error_for_status(self.http.get(&url).send().await?).await?;
        let body: RefreshResponse = resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))?;
        if body.token.is_empty() {
            return Err(ApiError::Parse("refresh returned an empty token".into()));
        }
        Ok(body.token)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = endpoint(&self.base_url, "/api/auth/logout");
        error_for_status(self.http.get(&url).send().await?).await?;
        Ok(())
    }

    fn login_url(&self, provider: &str) -> String {
        Self::login_url_for(&self.base_url, provider)
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
