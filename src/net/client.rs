//! Bearer-authenticated JSON helpers for the InfraKitchen REST API.
//!
//! ERROR HANDLING
//! ==============
//! A 401 means the access token went stale between session resolution and
//! this request. The client runs one refresh through the shared single-flight
//! refresher and retries exactly once; a second 401 (or a failed refresh) is
//! returned to the caller unchanged.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::api::{endpoint, error_for_status};
use super::types::ApiError;
use crate::session::SessionRefresher;
use crate::state::token::TokenStore;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    refresher: SessionRefresher,
}

impl ApiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, refresher: SessionRefresher) -> Self {
        Self { http, base_url: base_url.into(), refresher }
    }

    /// Token store the bearer header is read from.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.refresher.tokens()
    }

    /// `GET {base}/api/{path}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(reqwest::Method::GET, path, None).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// `POST {base}/api/{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let resp = self.send(reqwest::Method::POST, path, Some(&body)).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// `PATCH {base}/api/{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let resp = self.send(reqwest::Method::PATCH, path, Some(&body)).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// `DELETE {base}/api/{path}`; the response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(reqwest::Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = endpoint(&self.base_url, &format!("/api/{}", path.trim_start_matches('/')));
        match self.send_once(method.clone(), &url, body).await {
            Err(e) if e.is_unauthorized() => {
                debug!(%url, "request unauthorized, refreshing token");
                if self.refresher.refresh().await.is_err() {
                    return Err(e);
                }
                self.send_once(method, &url, body).await
            }
            other => other,
        }
    }

    async fn send_once(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut req = self.http.request(method, url);
        if let Some(token) = self.refresher.tokens().get() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        error_for_status(req.send().await?).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
