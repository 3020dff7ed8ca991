//! Durable preference storage.
//!
//! The registry remembers the active locale through the narrow
//! [`PreferenceStore`] contract: `get`/`set`/`delete` on string keys. The
//! store has to survive process restarts to be useful (that is its defining
//! reason to exist), but it has no concurrency or transactional
//! requirements.
//!
//! Two implementations are provided: [`MemoryStore`] for tests and hosts
//! that do not want durability, and [`FileStore`] for a JSON document on
//! disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::error;

/// Durable key/value storage for host preferences.
///
/// Writes are synchronous; `set` and `delete` are infallible from the
/// caller's point of view. Implementations that can fail internally (I/O)
/// report through the logging channel and keep their in-memory state.
pub trait PreferenceStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Remove the entry under `key`, if any.
    fn delete(&mut self, key: &str);
}

/// In-memory store with no durability.
///
/// Restarting the host loses every preference, so restore-on-startup never
/// finds anything; useful for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// On-disk document format: a flat string map.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// JSON-file-backed store.
///
/// The whole document is held in memory and rewritten on every mutation.
/// That is fine for the intended load: a handful of short strings, written
/// when the user switches locale.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`, loading the existing document if present.
    ///
    /// A missing file starts an empty store; an unreadable or malformed
    /// file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let file: PreferenceFile =
                    serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(StoreError::Read {
                    path,
                    message: e.to_string(),
                });
            }
        };
        Ok(Self { path, entries })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the backing file from the in-memory entries.
    ///
    /// An I/O failure is logged and the in-memory state is kept; the next
    /// mutation retries the write.
    fn flush(&self) {
        let document = PreferenceFile {
            entries: self.entries.clone(),
        };
        let json = match serde_json::to_string_pretty(&document) {
            Ok(json) => json,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to encode preference file");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            error!(path = %self.path.display(), error = %e, "failed to write preference file");
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn delete(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }
}

/// Errors from opening a [`FileStore`].
#[derive(Debug, Clone)]
pub enum StoreError {
    /// The backing file exists but could not be read.
    Read { path: PathBuf, message: String },
    /// The backing file could not be parsed as a preference document.
    Parse { path: PathBuf, message: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read preference file {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "malformed preference file {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}
