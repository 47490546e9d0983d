//! Reqwest-backed authentication gateway.
//!
//! This adapter owns transport details only: request serialisation,
//! timeout and HTTP error mapping, and JSON decoding into domain
//! types. Rejection bodies are parsed leniently — an unparseable body
//! becomes an empty payload so the gate's message rules still apply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::{Map, Value, json};

use super::{build_client, ensure_trailing_slash};
use crate::domain::identity::Identity;
use crate::domain::ports::{AuthGateway, AuthGatewayError, RegistrationRequest, TokenPair};

const LOGIN_PATH: &str = "api/auth/login/";
const PROFILE_PATH: &str = "api/auth/profile/";
const REGISTER_PATH: &str = "api/auth/register/";
const PASSWORD_RESET_PATH: &str = "api/auth/password-reset/";

/// Authentication adapter performing HTTP requests against one origin.
pub struct HttpAuthGateway {
    client: Client,
    base: Url,
}

impl HttpAuthGateway {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            base: ensure_trailing_slash(base),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthGatewayError> {
        self.base
            .join(path)
            .map_err(|error| AuthGatewayError::transport(format!("invalid endpoint URL: {error}")))
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthGatewayError> {
        let response = self
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = read_success_body(response).await?;
        serde_json::from_slice(&body)
            .map_err(|error| AuthGatewayError::decode(format!("invalid token payload: {error}")))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Identity, AuthGatewayError> {
        let response = self
            .client
            .get(self.endpoint(PROFILE_PATH)?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = read_success_body(response).await?;
        serde_json::from_slice(&body)
            .map_err(|error| AuthGatewayError::decode(format!("invalid profile payload: {error}")))
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<(), AuthGatewayError> {
        let response = self
            .client
            .post(self.endpoint(REGISTER_PATH)?)
            .json(&json!({
                "email": request.email,
                "password": request.password.as_str(),
                "password2": request.password.as_str(),
                "first_name": request.first_name,
                "last_name": request.last_name,
            }))
            .send()
            .await
            .map_err(map_transport_error)?;
        read_success_body(response).await.map(|_| ())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthGatewayError> {
        let response = self
            .client
            .post(self.endpoint(PASSWORD_RESET_PATH)?)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(map_transport_error)?;
        read_success_body(response).await.map(|_| ())
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<Vec<u8>, AuthGatewayError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(rejection(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> AuthGatewayError {
    AuthGatewayError::transport(error.to_string())
}

fn rejection(status: StatusCode, body: &[u8]) -> AuthGatewayError {
    let payload =
        serde_json::from_slice::<Value>(body).unwrap_or_else(|_| Value::Object(Map::new()));
    AuthGatewayError::rejected(status.as_u16(), payload)
}
