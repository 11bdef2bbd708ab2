use super::*;
use crate::error::ErrorKind;
use crate::session::SessionStore;
use crate::test_support::{harness, spawn_backend, token_expiring_in};

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::{Value, json};

async fn login_route(Json(body): Json<Value>) -> axum::response::Response {
    match body["email"].as_str() {
        Some("admin@example.com") if body["password"] == "hunter2" => Json(json!({
            "token": "access-1",
            "refreshToken": "refresh-1",
            "user": { "name": "Admin" }
        }))
        .into_response(),
        Some("odd@example.com") => Json(json!({ "user": { "name": "Odd" } })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad credentials" }))).into_response(),
    }
}

async fn backend() -> String {
    spawn_backend(Router::new().route("/auth/login", post(login_route))).await
}

// =============================================================================
// login
// =============================================================================

#[test]
fn login_request_debug_hides_password() {
    let debug = format!("{:?}", LoginRequest::new("a@b.c", "hunter2"));
    assert!(debug.contains("a@b.c"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn login_request_requires_both_fields() {
    let ApiError::Validation(errors) = LoginRequest::new("", " ").validate().unwrap_err() else {
        panic!("expected validation error");
    };
    assert_eq!(errors.get("email"), Some("Email is required"));
    assert_eq!(errors.get("password"), Some("Password is required"));
}

#[tokio::test]
async fn login_persists_whole_response() {
    let url = backend().await;
    let h = harness(&url, None);
    let session = h.client.auth().login(&LoginRequest::new("admin@example.com", "hunter2")).await.unwrap();
    assert_eq!(session.access_token(), Some("access-1"));
    assert_eq!(session.refresh_token(), Some("refresh-1"));

    let stored = h.store.load().unwrap();
    assert_eq!(stored, session);
    assert_eq!(stored.extra["user"]["name"], "Admin");
}

#[tokio::test]
async fn login_without_token_is_invalid_response() {
    let url = backend().await;
    let h = harness(&url, None);
    let err = h.client.auth().login(&LoginRequest::new("odd@example.com", "x")).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid response from server");
    assert!(h.store.load().is_none());
}

#[tokio::test]
async fn login_rejected_credentials() {
    let url = backend().await;
    let h = harness(&url, None);
    let err = h.client.auth().login(&LoginRequest::new("admin@example.com", "wrong")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(h.store.load().is_none());
}

// =============================================================================
// logout / status
// =============================================================================

#[tokio::test]
async fn logout_clears_and_redirects() {
    let h = harness("http://127.0.0.1:9", Some(Session::new(token_expiring_in(3600))));
    h.client.auth().logout().unwrap();
    assert!(h.store.load().is_none());
    assert_eq!(h.navigator.last_redirect().as_deref(), Some(LOGIN_PATH));
}

#[tokio::test]
async fn status_reports_expiry_and_refresh() {
    let token = token_expiring_in(600);
    let h = harness("http://127.0.0.1:9", Some(Session::new(token).with_refresh_token("r")));
    let now = SystemTime::now();
    let status = h.client.auth().status(now);
    assert!(status.authenticated);
    assert!(status.can_refresh);

    let expires = status.expires_at.unwrap();
    let now_secs = now.duration_since(UNIX_EPOCH).unwrap().as_secs();
    assert!(expires > now_secs && expires <= now_secs + 601);
}

#[tokio::test]
async fn status_of_expired_session_clears_it() {
    let h = harness("http://127.0.0.1:9", Some(Session::new(token_expiring_in(-60))));
    let status = h.client.auth().status(SystemTime::now() + Duration::from_secs(1));
    assert!(!status.authenticated);
    assert_eq!(status.expires_at, None);
    assert!(h.store.load().is_none());
}
