use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::json;

use super::*;
use crate::test_helpers::spawn_backend;

fn api(base_url: &str) -> HttpAuthApi {
    HttpAuthApi::new(build_http_client(&ConsoleConfig::default()).unwrap(), base_url)
}

#[test]
fn endpoint_joins_without_double_slash() {
    assert_eq!(endpoint("http://host/", "/api/auth/refresh"), "http://host/api/auth/refresh");
    assert_eq!(endpoint("http://host", "api/auth/refresh"), "http://host/api/auth/refresh");
}

#[test]
fn login_url_is_provider_specific() {
    let api = api("http://backend.test/");
    assert_eq!(api.login_url("github"), "http://backend.test/api/auth/github/login");
    assert_eq!(api.login_url("ms entra"), "http://backend.test/api/auth/ms%20entra/login");
}

#[tokio::test]
async fn refresh_returns_token_from_body() {
    let app = Router::new().route("/api/auth/refresh", get(|| async { axum::Json(json!({ "token": "h.p.s" })) }));
    let base = spawn_backend(app).await;
    assert_eq!(api(&base).refresh().await, Ok("h.p.s".to_owned()));
}

#[tokio::test]
async fn refresh_non_2xx_is_status_error() {
    let app = Router::new().route("/api/auth/refresh", get(|| async { (StatusCode::UNAUTHORIZED, "expired") }));
    let base = spawn_backend(app).await;
    assert_eq!(
        api(&base).refresh().await,
        Err(ApiError::Status { status: 401, body: "expired".into() })
    );
}

#[tokio::test]
async fn refresh_bad_body_is_parse_error() {
    let app = Router::new().route("/api/auth/refresh", get(|| async { axum::Json(json!({ "access": "x" })) }));
    let base = spawn_backend(app).await;
    assert!(matches!(api(&base).refresh().await, Err(ApiError::Parse(_))));
}

#[tokio::test]
async fn refresh_empty_token_is_parse_error() {
    let app = Router::new().route("/api/auth/refresh", get(|| async { axum::Json(json!({ "token": "" })) }));
    let base = spawn_backend(app).await;
    assert!(matches!(api(&base).refresh().await, Err(ApiError::Parse(_))));
}

#[tokio::test]
async fn refresh_unreachable_backend_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    assert!(matches!(api(&format!("http://{addr}")).refresh().await, Err(ApiError::Request(_))));
}

#[tokio::test]
async fn logout_maps_status() {
    let app = Router::new().route("/api/auth/logout", get(|| async { StatusCode::OK }));
    let base = spawn_backend(app).await;
    assert_eq!(api(&base).logout().await, Ok(()));

    let app = Router::new().route("/api/auth/logout", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let base = spawn_backend(app).await;
    assert!(matches!(api(&base).logout().await, Err(ApiError::Status { status: 500, .. })));
}

#[tokio::test]
async fn refresh_sends_session_cookie_back() {
    use axum::http::HeaderMap;
    use axum::http::header::{COOKIE, SET_COOKIE};

    let app = Router::new()
        .route("/api/auth/session", get(|| async { ([(SET_COOKIE, "refresh=r1; Path=/")], "ok") }))
        .route(
            "/api/auth/refresh",
            get(|headers: HeaderMap| async move {
                let cookie = headers.get(COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default().to_owned();
                if cookie.contains("refresh=r1") {
                    (StatusCode::OK, axum::Json(json!({ "token": "h.p.s" })))
                } else {
                    (StatusCode::UNAUTHORIZED, axum::Json(json!({})))
                }
            }),
        );
    let base = spawn_backend(app).await;
    let http = build_http_client(&ConsoleConfig::default()).unwrap();
    http.get(format!("{base}/api/auth/session")).send().await.unwrap();

    let api = HttpAuthApi::new(http, base);
    assert_eq!(api.refresh().await, Ok("h.p.s".to_owned()));
}
