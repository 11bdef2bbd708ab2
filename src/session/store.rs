//! Session persistence.
//!
//! The session is one opaque JSON blob under a fixed key. Stores never
//! validate token contents; a blob that fails to parse is reported as absent.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::Session;
use crate::error::StoreError;

/// Fixed storage key. The file store names its file after it.
pub const STORAGE_KEY: &str = "authUser";

/// Exclusive owner of the persisted [`Session`].
pub trait SessionStore: Send + Sync {
    /// Stored session, or `None` when absent or malformed.
    fn load(&self) -> Option<Session>;

    /// Replace any stored session with `session`.
    ///
    /// # Errors
    ///
    /// Fails when the blob cannot be serialized or written.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Fails when the backing storage cannot be modified.
    fn clear(&self) -> Result<(), StoreError>;
}

fn parse_blob(raw: &str) -> Option<Session> {
    match serde_json::from_str::<Session>(raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed session blob");
            None
        }
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the blob as `<dir>/authUser.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{STORAGE_KEY}.json")) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_blob(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "session file unreadable");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let raw = serde_json::to_string(session)?;
        self.write_atomic(&raw)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Keeps the serialized blob in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    blob: Mutex<Option<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: &Session) -> Self {
        Self { blob: Mutex::new(serde_json::to_string(session).ok()) }
    }

    /// Seed the store with an arbitrary blob, valid or not.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { blob: Mutex::new(Some(raw.into())) }
    }

    /// Current blob exactly as stored.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.blob.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        let blob = self.blob.lock().unwrap_or_else(PoisonError::into_inner);
        blob.as_deref().and_then(parse_blob)
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let raw = serde_json::to_string(session)?;
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
