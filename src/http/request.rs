//! Per-call request context.
//!
//! DESIGN
//! ======
//! A context is built once per outbound call and never shared. A retry does
//! not flip a flag in place: [`RequestContext::into_retry`] consumes the
//! context and returns the next attempt, so concurrent calls each carry an
//! independent budget.

use reqwest::Method;
use serde_json::Value;

/// Resubmissions allowed after the first attempt.
pub const MAX_RETRIES: u8 = 1;

/// One file in a multipart body. Held as bytes so the form can be rebuilt
/// for a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    #[must_use]
    pub fn csv(field: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        Self { field: field.to_owned(), file_name: file_name.to_owned(), mime: "text/csv".to_owned(), bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Sent as `multipart/form-data`; the content type is left to the
    /// transport so it can add the boundary.
    Multipart(Vec<FilePart>),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl RequestBody {
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    attempt: u8,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty, attempt: 0 }
    }

    #[must_use]
    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        self.query = query.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Zero for the original submission.
    #[must_use]
    pub fn attempt(&self) -> u8 {
        self.attempt
    }

    /// `true` once the retry budget is spent.
    #[must_use]
    pub fn retried(&self) -> bool {
        self.attempt >= MAX_RETRIES
    }

    /// The same request, one attempt later.
    #[must_use]
    pub fn into_retry(mut self) -> Self {
        self.attempt = self.attempt.saturating_add(1);
        self
    }
}

#[cfg(test)]
#[path = "request_test.rs"]
mod tests;
