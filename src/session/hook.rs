//! Mount-time session check.
//!
//! A [`SessionHook`] starts out loading, reads the store once, and settles
//! into a [`SessionView`]. Expiry is only evaluated during that single
//! resolution; a token that expires later is caught by the backend's 401.

use std::sync::Arc;
use std::time::SystemTime;

use super::{Session, SessionStore, decode_claims};

/// What a consuming view sees: the validated session and whether the check
/// is still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionView {
    #[must_use]
    pub fn loading() -> Self {
        Self { session: None, loading: true }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.session.is_some()
    }
}

pub struct SessionHook {
    store: Arc<dyn SessionStore>,
    view: SessionView,
}

impl SessionHook {
    /// Mount a hook over `store`. Nothing is read until [`Self::resolve`].
    #[must_use]
    pub fn mount(store: Arc<dyn SessionStore>) -> Self {
        Self { store, view: SessionView::loading() }
    }

    #[must_use]
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Run the check against `now`. Only the first call per mount touches
    /// the store; later calls return the settled view.
    pub fn resolve(&mut self, now: SystemTime) -> &SessionView {
        if self.view.loading {
            self.view = SessionView { session: self.check(now), loading: false };
        }
        &self.view
    }

    fn check(&self, now: SystemTime) -> Option<Session> {
        let session = self.store.load()?;
        let Some(token) = session.access_token() else {
            return Some(session);
        };

        match decode_claims(token) {
            Ok(claims) if claims.is_expired_at(now) => {
                tracing::info!("stored session expired; clearing");
                if let Err(e) = self.store.clear() {
                    tracing::error!(error = %e, "failed to clear expired session");
                }
                None
            }
            Ok(_) => Some(session),
            Err(e) => {
                tracing::error!(error = %e, "error checking authentication");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "hook_test.rs"]
mod tests;
