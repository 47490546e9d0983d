//! Test doubles for the gate's driven ports.
//!
//! Each double records its calls and serves a configurable response,
//! so suites can assert both outcomes and call counts (for example,
//! that bootstrap never touches the network).

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use client::domain::Identity;
use client::domain::ports::{AuthGateway, AuthGatewayError, RegistrationRequest, TokenPair};

/// Token pair every succeeding login serves.
pub fn test_tokens() -> TokenPair {
    TokenPair {
        access: "it-access".to_owned(),
        refresh: "it-refresh".to_owned(),
    }
}

/// Recording authentication gateway with configurable outcomes.
pub struct RecordingAuthGateway {
    login_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    register_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    login_response: Mutex<Result<TokenPair, AuthGatewayError>>,
    profile_response: Mutex<Result<Identity, AuthGatewayError>>,
    register_response: Mutex<Result<(), AuthGatewayError>>,
    reset_response: Mutex<Result<(), AuthGatewayError>>,
}

impl RecordingAuthGateway {
    /// A gateway whose every operation succeeds, serving `profile`
    /// from the profile endpoint.
    pub fn succeeding(profile: Identity) -> Self {
        Self {
            login_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            login_response: Mutex::new(Ok(test_tokens())),
            profile_response: Mutex::new(Ok(profile)),
            register_response: Mutex::new(Ok(())),
            reset_response: Mutex::new(Ok(())),
        }
    }

    pub fn set_login_response(&self, response: Result<TokenPair, AuthGatewayError>) {
        *self.login_response.lock().expect("login response lock") = response;
    }

    pub fn set_profile_response(&self, response: Result<Identity, AuthGatewayError>) {
        *self.profile_response.lock().expect("profile response lock") = response;
    }

    pub fn set_register_response(&self, response: Result<(), AuthGatewayError>) {
        *self.register_response.lock().expect("register response lock") = response;
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    /// Total calls across every operation.
    pub fn total_calls(&self) -> usize {
        self.login_calls() + self.profile_calls() + self.register_calls() + self.reset_calls()
    }
}

#[async_trait]
impl AuthGateway for RecordingAuthGateway {
    async fn login(&self, _email: &str, _password: &str) -> Result<TokenPair, AuthGatewayError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.login_response.lock().expect("login response lock").clone()
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<Identity, AuthGatewayError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile_response
            .lock()
            .expect("profile response lock")
            .clone()
    }

    async fn register(&self, _request: &RegistrationRequest) -> Result<(), AuthGatewayError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.register_response
            .lock()
            .expect("register response lock")
            .clone()
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), AuthGatewayError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        self.reset_response.lock().expect("reset response lock").clone()
    }
}
