use super::*;

#[test]
fn unauthorized_only_for_401() {
    let unauthorized = ApiError::Status { status: 401, body: String::new() };
    let forbidden = ApiError::Status { status: 403, body: String::new() };
    assert!(unauthorized.is_unauthorized());
    assert!(!forbidden.is_unauthorized());
    assert!(!ApiError::Request("boom".into()).is_unauthorized());
}

#[test]
fn status_error_display_includes_code() {
    let err = ApiError::Status { status: 502, body: "bad gateway".into() };
    assert_eq!(err.to_string(), "API response error: status 502");
}

#[test]
fn refresh_response_parses_token_field() {
    let body: RefreshResponse = serde_json::from_str(r#"{"token":"a.b.c"}"#).unwrap();
    assert_eq!(body.token, "a.b.c");
}

#[test]
fn refresh_response_rejects_missing_token() {
    assert!(serde_json::from_str::<RefreshResponse>(r#"{"access":"a.b.c"}"#).is_err());
}
