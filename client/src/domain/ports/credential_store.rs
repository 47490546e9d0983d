//! Port for the durable local store.
//!
//! The store is the page-reload-surviving key-value persistence that
//! holds the credential pair and the cached identity. The gate only
//! ever touches the three keys below, always as strings; adapters own
//! the actual persistence (a JSON file in production, memory in
//! tests).

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

/// Store key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Store key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Store key holding the JSON-serialised cached identity.
pub const CACHED_IDENTITY_KEY: &str = "user";

/// Errors surfaced by durable-store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialStoreError {
    /// The backing medium could not be read.
    #[error("credential store read failed: {message}")]
    Read { message: String },
    /// The backing medium could not be written.
    #[error("credential store write failed: {message}")]
    Write { message: String },
}

impl CredentialStoreError {
    /// Helper for read failures.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Helper for write failures.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Port for reload-surviving key-value persistence.
///
/// Operations are synchronous: session bootstrap must not suspend, so
/// adapters keep their working set in memory and treat the backing
/// medium as a flush target.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), CredentialStoreError>;

    /// Remove the value stored under `key`. Removing an absent key is
    /// not an error.
    fn remove(&self, key: &str) -> Result<(), CredentialStoreError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryCredentialStore::new();
        store.put(ACCESS_TOKEN_KEY, "tok").expect("put");
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).expect("get"),
            Some("tok".to_owned())
        );

        store.remove(ACCESS_TOKEN_KEY).expect("remove");
        assert_eq!(store.get(ACCESS_TOKEN_KEY).expect("get"), None);
    }

    #[test]
    fn removing_an_absent_key_is_not_an_error() {
        let store = MemoryCredentialStore::new();
        store.remove("never-written").expect("remove");
    }
}
