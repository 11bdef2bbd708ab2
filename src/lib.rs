//! # appadmin
//!
//! Client library for the application administration backend. It manages
//! OAuth-style client applications, mapped application users, Azure
//! credential records, and bulk CSV imports over the backend's REST API.
//!
//! The crate is organized leaf-first:
//!
//! - [`session`] persists the login session, validates it once per mount, and
//!   gates protected work behind it.
//! - [`http`] is the single egress point: bearer attachment, one silent
//!   token refresh on 401, and status-to-message normalization.
//! - [`api`] holds the typed resource clients, each normalizing backend
//!   responses at the boundary.
//! - [`listing`] filters and paginates the lists those clients return.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AdminConfig;
pub use error::{ApiError, ErrorKind};
pub use http::ApiClient;
pub use session::{Session, SessionStore};
