//! Login session model and the pieces that guard it.
//!
//! ARCHITECTURE
//! ============
//! `store` persists the session as one JSON blob, `hook` validates it once
//! per mount by decoding the access token's `exp` claim, and `gate` turns the
//! hook's view into a render-or-redirect decision.
//!
//! TRADE-OFFS
//! ==========
//! Claims are decoded locally without signature verification. The backend is
//! the authority; the local check only avoids sending a token that is known
//! to be expired.

pub mod gate;
pub mod hook;
pub mod store;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use gate::{GateOutcome, Navigator, RecordingNavigator, RouteGate};
pub use hook::{SessionHook, SessionView};
pub use store::{FileSessionStore, MemorySessionStore, STORAGE_KEY, SessionStore};

/// Application path the console sends unauthenticated users to.
pub const LOGIN_PATH: &str = "/login";

// =============================================================================
// SESSION
// =============================================================================

/// The client-held credential bundle for a logged-in operator.
///
/// Mirrors the login response: `token` and `refreshToken` are interpreted,
/// every other field is kept as-is so a save after refresh loses nothing.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), refresh_token: None, extra: Map::new() }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Access token, if present and non-empty.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    /// Refresh token, if present and non-empty.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|token| !token.is_empty())
    }

    /// Decode the access token's claims.
    ///
    /// # Errors
    ///
    /// Returns a [`ClaimsError`] when there is no access token or it is not a
    /// three-part token with a base64url JSON payload.
    pub fn claims(&self) -> Result<Claims, ClaimsError> {
        decode_claims(self.access_token().ok_or(ClaimsError::MissingToken)?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// CLAIMS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("session has no access token")]
    MissingToken,

    #[error("token has no payload segment")]
    MissingPayload,

    #[error("token payload is not base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded access-token payload. Only `exp` is interpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry in seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Claims {
    /// `true` when `exp` lies strictly before `now`. A token without `exp`
    /// never expires locally.
    #[must_use]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        let Some(exp) = self.exp else {
            return false;
        };
        #[allow(clippy::cast_precision_loss)]
        let now_ms = now.duration_since(UNIX_EPOCH).map_or(0.0, |elapsed| elapsed.as_millis() as f64);
        exp * 1000.0 < now_ms
    }

    /// Expiry as a [`SystemTime`], if the claim is present and representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<SystemTime> {
        let exp = std::time::Duration::try_from_secs_f64(self.exp?).ok()?;
        UNIX_EPOCH.checked_add(exp)
    }
}

/// Decode the middle segment of a `header.payload.signature` token.
///
/// # Errors
///
/// Fails when the payload segment is missing, not base64, or not JSON.
pub fn decode_claims(token: &str) -> Result<Claims, ClaimsError> {
    let payload = token.split('.').nth(1).filter(|segment| !segment.is_empty()).ok_or(ClaimsError::MissingPayload)?;
    let payload = payload.trim_end_matches('=');
    let bytes = match URL_SAFE_NO_PAD.decode(payload) {
        Ok(bytes) => bytes,
        Err(_) => STANDARD_NO_PAD.decode(payload)?,
    };
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
