//! Shared fixtures for unit tests: JWT-shaped tokens and an in-process mock
//! backend.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::config::AdminConfig;
use crate::http::ApiClient;
use crate::session::{MemorySessionStore, RecordingNavigator, Session, SessionStore};

/// Build an unsigned `header.payload.sig` token carrying `claims`.
pub(crate) fn token_with_claims(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

/// Token expiring `offset_secs` from now (negative for the past).
pub(crate) fn token_expiring_in(offset_secs: i64) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_secs();
    let now = i64::try_from(now).unwrap_or(i64::MAX);
    token_with_claims(&serde_json::json!({ "sub": "admin@example.com", "exp": now + offset_secs }))
}

/// Serve `router` on an ephemeral local port, returning its base URL.
pub(crate) async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock backend failed");
    });
    format!("http://{addr}")
}

pub(crate) struct Harness {
    pub client: ApiClient,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
}

/// Client wired to `base_url` with an in-memory store seeded with `session`.
pub(crate) fn harness(base_url: &str, session: Option<Session>) -> Harness {
    let store = Arc::new(match session {
        Some(session) => MemorySessionStore::with_session(&session),
        None => MemorySessionStore::new(),
    });
    let navigator = Arc::new(RecordingNavigator::new());
    let config = AdminConfig::new(base_url, std::env::temp_dir()).expect("test config");
    let client = ApiClient::new(&config, Arc::clone(&store) as Arc<dyn SessionStore>, Arc::clone(&navigator) as _)
        .expect("test client");
    Harness { client, store, navigator }
}
