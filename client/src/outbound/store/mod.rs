//! Durable-store adapters.

mod file_store;

pub use self::file_store::FileCredentialStore;
