//! Route gate and the navigation seam it redirects through.

use std::sync::{Arc, Mutex, PoisonError};

use super::{LOGIN_PATH, Session, SessionView};

/// Where forced navigation goes. Implementations replace the current
/// location so "back" does not return to the guarded view.
pub trait Navigator: Send + Sync {
    fn replace(&self, path: &str);
}

/// Navigator that logs each redirect and remembers the targets.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_redirect(&self) -> Option<String> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        tracing::warn!(path, "redirecting");
        self.history.lock().unwrap_or_else(PoisonError::into_inner).push(path.to_owned());
    }
}

/// Result of passing a [`SessionView`] through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// Session check still pending; show a neutral indicator only.
    Loading,
    /// No session; the navigator has already been sent here.
    Redirect(&'static str),
    /// Guarded content, produced with the validated session.
    Render(T),
}

pub struct RouteGate {
    navigator: Arc<dyn Navigator>,
}

impl RouteGate {
    #[must_use]
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Produce `content` only for a settled, authenticated view.
    pub fn guard<T>(&self, view: &SessionView, content: impl FnOnce(&Session) -> T) -> GateOutcome<T> {
        if view.loading {
            return GateOutcome::Loading;
        }
        match &view.session {
            Some(session) => GateOutcome::Render(content(session)),
            None => {
                self.navigator.replace(LOGIN_PATH);
                GateOutcome::Redirect(LOGIN_PATH)
            }
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
