//! File-backed durable store.
//!
//! A single JSON object on disk plays the role the browser's
//! localStorage plays for the web client: a small string map that
//! survives process restarts. The working set lives in memory so
//! reads never touch the filesystem; every mutation flushes the whole
//! map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::warn;

use crate::domain::ports::{CredentialStore, CredentialStoreError};

/// Durable store persisting to one JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`, loading any existing entries.
    ///
    /// A missing file starts an empty store. An undecodable file also
    /// starts empty (with a warning): a corrupted session cache should
    /// cost a re-login, not brick the client.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialStoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(path = %path.display(), %error, "session file undecodable; starting empty");
                    HashMap::new()
                }
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => {
                return Err(CredentialStoreError::read(format!(
                    "{}: {error}",
                    path.display()
                )));
            }
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    CredentialStoreError::write(format!("{}: {error}", parent.display()))
                })?;
            }
        }
        let encoded = serde_json::to_string_pretty(entries)
            .map_err(|error| CredentialStoreError::write(error.to_string()))?;
        fs::write(&self.path, encoded)
            .map_err(|error| CredentialStoreError::write(format!("{}: {error}", self.path.display())))
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            return self.flush(&entries);
        }
        Ok(())
    }
}
