//! Where a signed-in session survives between launches.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use learnly_core::model::Session;

use crate::repository::StorageError;

pub trait SessionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if a stored session exists but cannot be read.
    fn load(&self) -> Result<Option<Session>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if a stored session exists but cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Keeps the session as a JSON file.
///
/// Reads and writes are blocking `std::fs` calls made from async auth code.
/// The file is a few hundred bytes and touched only on sign-in, sign-out,
/// refresh and startup.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Connection(err.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // A corrupt file is a signed-out user, not a startup failure.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "discarding unreadable session file"
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::Connection(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Connection(err.to_string())),
        }
    }
}

/// Process-lifetime store for tests and demo runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}
