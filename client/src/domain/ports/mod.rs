//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the gate expects to interact with driven
//! adapters (the remote API over HTTP, the durable local store). Each
//! trait exposes strongly typed errors so adapters map their failures
//! into predictable variants instead of returning `anyhow::Result`.

pub mod auth_gateway;
pub mod case_gateway;
pub mod credential_store;

pub use self::auth_gateway::{AuthGateway, AuthGatewayError, RegistrationRequest, TokenPair};
pub use self::case_gateway::{CaseGateway, CaseGatewayError};
pub use self::credential_store::{
    ACCESS_TOKEN_KEY, CACHED_IDENTITY_KEY, CredentialStore, CredentialStoreError,
    MemoryCredentialStore, REFRESH_TOKEN_KEY,
};

#[cfg(test)]
pub use self::auth_gateway::MockAuthGateway;
#[cfg(test)]
pub use self::case_gateway::MockCaseGateway;
#[cfg(test)]
pub use self::credential_store::MockCredentialStore;
