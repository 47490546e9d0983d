//! Driven port for the remote authentication endpoints.
//!
//! The gate talks to the remote API exclusively through this trait so
//! the session state machine can be exercised against doubles. The
//! adapter owns transport detail; rejections travel back with the
//! parsed JSON error payload so the gate can apply its message rules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::identity::{Identity, split_display_name};

/// Credential pair issued by the remote API on successful login.
///
/// Both tokens are opaque strings; the gate only stores them and
/// attaches the access token to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token attached to authenticated requests.
    pub access: String,
    /// Token the remote API accepts to mint a fresh access token.
    pub refresh: String,
}

/// Payload for the registration endpoint.
///
/// The remote API wants the name pre-split and the password repeated;
/// [`RegistrationRequest::from_display_name`] performs both.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Login email for the new account.
    pub email: String,
    /// First token of the submitted display name.
    pub first_name: String,
    /// Remainder of the display name, possibly empty.
    pub last_name: String,
    /// Password, wiped from memory on drop.
    pub password: Zeroizing<String>,
}

impl RegistrationRequest {
    /// Build the payload from the form's free-text name field.
    pub fn from_display_name(
        name: &str,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let (first_name, last_name) = split_display_name(name);
        Self {
            email: email.into(),
            first_name,
            last_name,
            password: Zeroizing::new(password.into()),
        }
    }
}

/// Errors surfaced by remote-authentication adapters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthGatewayError {
    /// The remote API answered with a non-success status.
    ///
    /// `payload` is the parsed JSON error body, or an empty object
    /// when the body was absent or unparseable.
    #[error("remote API rejected the request with status {status}")]
    Rejected { status: u16, payload: Value },
    /// The request never produced a usable response.
    #[error("{message}")]
    Transport { message: String },
    /// A success response carried a body the client could not decode.
    #[error("remote API response could not be decoded: {message}")]
    Decode { message: String },
}

impl AuthGatewayError {
    /// Helper for rejection responses.
    pub fn rejected(status: u16, payload: Value) -> Self {
        Self::Rejected { status, payload }
    }

    /// Helper for rejection responses whose body was unparseable.
    pub fn rejected_opaque(status: u16) -> Self {
        Self::Rejected {
            status,
            payload: Value::Object(Map::new()),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Driven port for the remote API's authentication surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a token pair.
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthGatewayError>;

    /// Fetch the authenticated account's profile.
    async fn fetch_profile(&self, access_token: &str) -> Result<Identity, AuthGatewayError>;

    /// Create a new account. The remote API does not authenticate the
    /// caller on success; the gate chains into [`AuthGateway::login`].
    async fn register(&self, request: &RegistrationRequest) -> Result<(), AuthGatewayError>;

    /// Ask the remote API to start a password reset for `email`.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthGatewayError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn registration_request_splits_the_name() {
        let request = RegistrationRequest::from_display_name("Jane van Doe", "j@d.com", "pw");
        assert_eq!(request.first_name, "Jane");
        assert_eq!(request.last_name, "van Doe");
        assert_eq!(request.email, "j@d.com");
        assert_eq!(*request.password, "pw");
    }

    #[test]
    fn opaque_rejection_carries_an_empty_object() {
        let error = AuthGatewayError::rejected_opaque(502);
        let AuthGatewayError::Rejected { status, payload } = error else {
            panic!("expected a rejection");
        };
        assert_eq!(status, 502);
        assert_eq!(payload, serde_json::json!({}));
    }

    #[test]
    fn token_pair_decodes_the_wire_shape() {
        let pair: TokenPair =
            serde_json::from_value(serde_json::json!({ "access": "a", "refresh": "r" }))
                .expect("token pair decodes");
        assert_eq!(pair.access, "a");
        assert_eq!(pair.refresh, "r");
    }
}
