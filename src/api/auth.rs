//! Login, logout, and session status.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{ApiError, ValidationErrors};
use crate::http::ApiClient;
use crate::session::{LOGIN_PATH, Session, SessionHook};

const LOGIN_ENDPOINT: &str = "/auth/login";

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest").field("email", &self.email).finish_non_exhaustive()
    }
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when either field is blank.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email, "Email is required");
        errors.require("password", &self.password, "Password is required");
        errors.into_result()
    }
}

/// Snapshot of the stored session as the mount-time check sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    /// Access token expiry as Unix seconds, when the token carries one.
    pub expires_at: Option<u64>,
    pub can_refresh: bool,
}

pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }
}

impl Auth<'_> {
    /// Exchange credentials for a session and persist the whole response.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for blank input, [`ApiError::Rejected`] when
    /// the response carries no token, or pipeline errors.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        request.validate()?;
        let body = self.client.post(LOGIN_ENDPOINT, serde_json::to_value(request).map_err(decode)?.into()).await?;

        let has_token = body.get("token").and_then(serde_json::Value::as_str).is_some_and(|t| !t.is_empty());
        if !has_token {
            return Err(ApiError::Rejected("Invalid response from server".into()));
        }
        let session: Session = serde_json::from_value(body).map_err(decode)?;
        self.client.store().save(&session)?;
        tracing::info!(email = %request.email, "logged in");
        Ok(session)
    }

    /// Drop the stored session and send the navigator to the login path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Store`] if the session could not be removed.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.store().clear()?;
        self.client.navigator().replace(LOGIN_PATH);
        tracing::info!("logged out");
        Ok(())
    }

    /// Resolve the session hook once and report what it found.
    #[must_use]
    pub fn status(&self, now: SystemTime) -> SessionStatus {
        let mut hook = SessionHook::mount(Arc::clone(self.client.store()));
        let view = hook.resolve(now);
        let session = view.session.as_ref();
        let expires_at = session
            .and_then(|s| s.claims().ok())
            .and_then(|claims| claims.expires_at())
            .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());
        SessionStatus {
            authenticated: view.is_authenticated(),
            expires_at,
            can_refresh: session.and_then(Session::refresh_token).is_some(),
        }
    }
}

fn decode(e: serde_json::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
