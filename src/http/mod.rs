//! Backend egress: the authenticated client and its request pipeline.

pub mod client;
pub mod request;

pub use client::{ApiClient, REFRESH_PATH};
pub use request::{FilePart, MAX_RETRIES, RequestBody, RequestContext};
