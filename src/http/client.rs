//! Authenticated HTTP client for the admin backend.
//!
//! ARCHITECTURE
//! ============
//! Every backend call goes through [`ApiClient::execute`], which runs a fixed
//! pipeline per attempt:
//!
//! 1. request interceptor: load the session and attach `Authorization: Bearer`
//!    when an access token exists (absence is not an error);
//! 2. network;
//! 3. response interceptor: pass 2xx through, spend the single retry on a
//!    401 by refreshing the token, or normalize the status into an
//!    [`ApiError`].
//!
//! ERROR HANDLING
//! ==============
//! A failed or unavailable refresh clears the session and sends the
//! navigator to the login path before the 401 is surfaced. Other statuses
//! never retry.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;

use super::request::{FilePart, RequestBody, RequestContext};
use crate::config::AdminConfig;
use crate::error::ApiError;
use crate::session::{LOGIN_PATH, Navigator, Session, SessionStore};

/// Backend endpoint that exchanges a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/auth/refresh-token";

#[derive(serde::Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    token: Option<String>,
}

enum Refresh {
    Renewed,
    Unavailable,
    Failed,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Build a client for `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the transport cannot be built.
    pub fn new(
        config: &AdminConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.api_url.trim_end_matches('/').to_owned(), store, navigator })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    // -------------------------------------------------------------------------
    // helpers
    // -------------------------------------------------------------------------

    /// `GET path?query`, decoded as JSON.
    ///
    /// # Errors
    ///
    /// Any normalized [`ApiError`] from the pipeline.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let response = self.execute(RequestContext::new(Method::GET, path).with_query(query)).await?;
        read_json(response).await
    }

    /// `POST path` with a JSON or multipart body.
    ///
    /// # Errors
    ///
    /// Any normalized [`ApiError`] from the pipeline.
    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Value, ApiError> {
        let response = self.execute(RequestContext::new(Method::POST, path).with_body(body)).await?;
        read_json(response).await
    }

    /// `PUT path` with a JSON or multipart body.
    ///
    /// # Errors
    ///
    /// Any normalized [`ApiError`] from the pipeline.
    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Value, ApiError> {
        let response = self.execute(RequestContext::new(Method::PUT, path).with_body(body)).await?;
        read_json(response).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Any normalized [`ApiError`] from the pipeline.
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.execute(RequestContext::new(Method::DELETE, path)).await?;
        read_json(response).await
    }

    /// `GET path` returning the raw body, for file downloads.
    ///
    /// # Errors
    ///
    /// Any normalized [`ApiError`] from the pipeline.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.execute(RequestContext::new(Method::GET, path)).await?;
        let bytes = response.bytes().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    // -------------------------------------------------------------------------
    // pipeline
    // -------------------------------------------------------------------------

    /// Run `ctx` through the interceptor pipeline, returning the successful
    /// response.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] when no response arrives,
    /// [`ApiError::Unauthorized`] once the refresh budget is spent, or the
    /// status-mapped error for any other failure.
    pub async fn execute(&self, ctx: RequestContext) -> Result<Response, ApiError> {
        let mut ctx = ctx;
        loop {
            let session = self.store.load();
            let response = self.send(&ctx, session.as_ref()).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED {
                if ctx.retried() {
                    tracing::warn!(path = %ctx.path, "401 after retry; ending session");
                    self.force_logout();
                    return Err(ApiError::Unauthorized);
                }
                ctx = ctx.into_retry();
                match self.refresh(session).await {
                    Refresh::Renewed => continue,
                    Refresh::Unavailable | Refresh::Failed => {
                        self.force_logout();
                        return Err(ApiError::Unauthorized);
                    }
                }
            }

            let body = read_json(response).await.unwrap_or(Value::Null);
            let err = ApiError::from_status(status.as_u16(), &body);
            tracing::debug!(path = %ctx.path, status = status.as_u16(), error = %err, "request failed");
            return Err(err);
        }
    }

    async fn send(&self, ctx: &RequestContext, session: Option<&Session>) -> Result<Response, ApiError> {
        tracing::debug!(method = %ctx.method, path = %ctx.path, attempt = ctx.attempt(), "sending request");

        let mut request = self.http.request(ctx.method.clone(), self.url(&ctx.path));
        if !ctx.query.is_empty() {
            request = request.query(&ctx.query);
        }
        if let Some(token) = session.and_then(Session::access_token) {
            request = request.bearer_auth(token);
        }
        request = match &ctx.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.header(CONTENT_TYPE, "application/json").json(value),
            RequestBody::Multipart(parts) => {
                request.multipart(build_form(parts).map_err(|e| ApiError::HttpClientBuild(e.to_string()))?)
            }
        };

        request.send().await.map_err(|e| {
            tracing::warn!(path = %ctx.path, error = %e, "no response from backend");
            ApiError::Network(e.to_string())
        })
    }

    /// Exchange the session's refresh token for a new access token and
    /// persist it. Bypasses the pipeline so it can never recurse.
    async fn refresh(&self, session: Option<Session>) -> Refresh {
        let Some(mut session) = session else {
            return Refresh::Unavailable;
        };
        let Some(refresh_token) = session.refresh_token().map(str::to_owned) else {
            tracing::info!("401 without refresh token");
            return Refresh::Unavailable;
        };

        let result = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await;
        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "token refresh rejected");
                return Refresh::Failed;
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                return Refresh::Failed;
            }
        };

        let token = match response.json::<RefreshResponse>().await {
            Ok(body) => body.token.filter(|token| !token.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "token refresh returned unreadable body");
                return Refresh::Failed;
            }
        };
        let Some(token) = token else {
            tracing::warn!("token refresh returned no token");
            return Refresh::Unavailable;
        };

        session.token = Some(token);
        if let Err(e) = self.store.save(&session) {
            tracing::error!(error = %e, "failed to persist refreshed session");
            return Refresh::Failed;
        }
        tracing::info!("access token refreshed");
        Refresh::Renewed
    }

    fn force_logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "failed to clear session");
        }
        self.navigator.replace(LOGIN_PATH);
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') { format!("{}{path}", self.base_url) } else { format!("{}/{path}", self.base_url) }
    }
}

// =============================================================================
// BODIES
// =============================================================================

fn build_form(parts: &[FilePart]) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for part in parts {
        let file = Part::bytes(part.bytes.clone()).file_name(part.file_name.clone()).mime_str(&part.mime)?;
        form = form.part(part.field.clone(), file);
    }
    Ok(form)
}

/// Decode a JSON body; an empty body reads as `Null`.
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let bytes = response.bytes().await.map_err(|e| ApiError::Network(e.to_string()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
