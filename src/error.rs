//! Error descriptors shared by the HTTP wrapper and the resource clients.
//!
//! ERROR HANDLING
//! ==============
//! Every failure a caller can see is an [`ApiError`]. Its `Display` output is
//! the normalized, human-readable message a console shows to the operator;
//! [`ApiError::kind`] gives the coarse category for branching.

use std::fmt;

use serde_json::Value;

pub const MSG_NETWORK: &str = "Network Error - Please check your connection";
pub const MSG_BAD_REQUEST: &str = "Bad Request";
pub const MSG_UNAUTHORIZED: &str = "Invalid credentials";
pub const MSG_NOT_FOUND: &str = "Resource not found";
pub const MSG_SERVER: &str = "Internal Server Error";
pub const MSG_FALLBACK: &str = "An error occurred";

// =============================================================================
// KIND
// =============================================================================

/// Coarse category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received.
    Network,
    /// HTTP 400.
    BadRequest,
    /// HTTP 401 after the refresh budget was spent.
    Unauthorized,
    /// HTTP 404.
    NotFound,
    /// HTTP 500.
    Server,
    /// Any other non-success status.
    Unknown,
    /// The backend answered 2xx but reported `success: false`.
    Rejected,
    /// The response body did not have the expected shape.
    Decode,
    /// Local input failed required-field checks.
    Validation,
    /// The session store could not be written.
    Storage,
    /// The client could not be constructed or configured.
    Config,
}

// =============================================================================
// API ERROR
// =============================================================================

/// Errors produced by [`crate::ApiClient`] and the resource clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("Network Error - Please check your connection")]
    Network(String),

    #[error("Bad Request")]
    BadRequest,

    /// The session was rejected and could not be refreshed.
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Resource not found")]
    NotFound,

    #[error("Internal Server Error")]
    Server,

    /// Unmapped status; `message` is the server's own or the generic fallback.
    #[error("{message}")]
    Unknown { status: u16, message: String },

    /// The backend envelope reported failure.
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response format: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("session store failed: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Map a non-success, non-401 HTTP status to its normalized error.
    ///
    /// `body` is the decoded response body (or `Null`); its `message` field is
    /// used only for statuses without a fixed message.
    #[must_use]
    pub fn from_status(status: u16, body: &Value) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            500 => Self::Server,
            _ => Self::Unknown {
                status,
                message: body
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|message| !message.is_empty())
                    .unwrap_or(MSG_FALLBACK)
                    .to_owned(),
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::BadRequest => ErrorKind::BadRequest,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound => ErrorKind::NotFound,
            Self::Server => ErrorKind::Server,
            Self::Unknown { .. } => ErrorKind::Unknown,
            Self::Rejected(_) => ErrorKind::Rejected,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_) | Self::Io(_) => ErrorKind::Storage,
            Self::HttpClientBuild(_) => ErrorKind::Config,
        }
    }

    /// HTTP status behind this error, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest => Some(400),
            Self::Unauthorized => Some(401),
            Self::NotFound => Some(404),
            Self::Server => Some(500),
            Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// STORE ERROR
// =============================================================================

/// Failure while persisting or clearing the session.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Field-level required/format failures collected from a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    /// Record `message` for `field` when `value` is blank.
    pub fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(name, message)| (*name, message.as_str()))
    }

    /// `Ok` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] carrying every recorded failure.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() { Ok(()) } else { Err(ApiError::Validation(self)) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
