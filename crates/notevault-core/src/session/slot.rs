//! Persistence for the session credential.
//!
//! A slot holds at most one `Session` (token plus user identity). The
//! `CredentialSlot` trait keeps the store independent of where the session
//! lives, so tests and one-shot runs can use memory while the CLI persists
//! to disk.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{ClientError, Result};
use crate::fs::{remove_if_exists, write_atomic};
use crate::models::Session;

/// Storage backend for the single session slot.
pub trait CredentialSlot: Send + Sync {
    /// Read the stored session.
    ///
    /// Returns `Ok(None)` when the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the slot exists but cannot be read
    /// or parsed.
    fn load(&self) -> Result<Option<Session>>;

    /// Replace the slot contents.
    fn save(&self, session: &Session) -> Result<()>;

    /// Empty the slot. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<()>;
}

/// Session slot kept as a JSON file with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSlot for FileSlot {
    fn load(&self) -> Result<Option<Session>> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ClientError::Storage(format!(
                    "Failed to read session {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        let session: Session = serde_json::from_slice(&contents).map_err(|e| {
            ClientError::Storage(format!(
                "Failed to parse session {}: {}",
                self.path.display(),
                e
            ))
        })?;
        if session.token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let contents = serde_json::to_vec_pretty(session)
            .map_err(|e| ClientError::Storage(format!("Failed to encode session: {}", e)))?;
        write_atomic(&self.path, &contents).map_err(|e| {
            ClientError::Storage(format!(
                "Failed to write session {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path).map_err(|e| {
            ClientError::Storage(format!(
                "Failed to remove session {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory slot; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySlot {
    session: Mutex<Option<Session>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that starts out holding `session`, as if recovered from storage.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl CredentialSlot for MemorySlot {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock() = None;
        Ok(())
    }
}
