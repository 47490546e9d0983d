//! The session and access gate.
//!
//! [`SessionService`] owns the authenticated-identity lifecycle:
//! bootstrap from the durable store, login, registration, logout, and
//! the role-based authorisation predicate the screens consult before
//! rendering. It is constructed once at the composition root and
//! passed to every consumer; there is no ambient global.
//!
//! Readers must treat the identity they obtain as a snapshot that may
//! change asynchronously and re-read on change rather than cache it.
//! The gate does not serialise concurrent operations: if two logins
//! are in flight, whichever completes last wins. The screens are
//! expected to prevent double submission while [`Session::is_pending`]
//! holds.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::error::{
    PASSWORD_RESET_FAILED, SessionError, login_rejection_message, registration_rejection_message,
};
use super::identity::{Identity, Role};
use super::ports::{
    ACCESS_TOKEN_KEY, AuthGateway, AuthGatewayError, CACHED_IDENTITY_KEY, CredentialStore,
    CredentialStoreError, REFRESH_TOKEN_KEY, RegistrationRequest, TokenPair,
};
use super::routing::{self, RouteDecision};

/// Process-wide session state: the current identity and the in-flight
/// request flag.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
    pending: bool,
}

impl Session {
    /// The authenticated identity, if anyone is signed in.
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// True when an identity is installed.
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// True while a login, registration, or reset call is in flight.
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Local profile update applied through the gate.
///
/// Only rewrites the cached identity; the credential pair is never
/// touched by a profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Free-form display name, split the same way registration splits
    /// it.
    pub display_name: Option<String>,
    /// Replacement login email.
    pub email: Option<String>,
}

/// The gate service, generic over its two driven ports.
pub struct SessionService<G, S> {
    gateway: Arc<G>,
    store: Arc<S>,
    state: RwLock<Session>,
}

impl<G, S> SessionService<G, S> {
    /// Create a gate with an empty, anonymous session.
    pub fn new(gateway: Arc<G>, store: Arc<S>) -> Self {
        Self {
            gateway,
            store,
            state: RwLock::new(Session::default()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current session state.
    pub fn snapshot(&self) -> Session {
        self.read_state().clone()
    }

    /// Snapshot of the current identity.
    pub fn identity(&self) -> Option<Identity> {
        self.read_state().identity.clone()
    }

    /// True while a gate operation is in flight.
    pub fn is_pending(&self) -> bool {
        self.read_state().pending
    }

    /// Answer whether the current identity may view a screen requiring
    /// one of `required`. Pure and idempotent; an empty set admits any
    /// authenticated identity.
    pub fn authorize(&self, required: &[Role]) -> RouteDecision {
        let state = self.read_state();
        routing::decide(state.identity.as_ref(), required)
    }
}

impl<G, S> SessionService<G, S>
where
    G: AuthGateway,
    S: CredentialStore,
{
    /// Restore a previously persisted identity without contacting the
    /// remote API.
    ///
    /// Invoked once at process start. The cached identity is trusted
    /// optimistically: the screens never flash an anonymous state for
    /// a returning user, at the cost of showing stale profile data
    /// until the next authenticated call refreshes it. Returns the
    /// restored identity, if any.
    pub fn bootstrap(&self) -> Option<Identity> {
        let raw = match self.store.get(CACHED_IDENTITY_KEY) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%error, "durable store unreadable during bootstrap; starting anonymous");
                return None;
            }
        };
        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => {
                debug!(email = identity.email(), "session restored from durable store");
                self.write_state().identity = Some(identity.clone());
                Some(identity)
            }
            Err(error) => {
                warn!(%error, "cached identity undecodable; starting anonymous");
                None
            }
        }
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// Persists the token pair, then enriches the session with the
    /// fetched profile. A failed profile fetch degrades to a minimal
    /// identity carrying only the email: the user is signed in either
    /// way. The pending flag is released on every exit path.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let _pending = PendingGuard::hold(&self.state);
        debug!(email, "login attempt");

        let tokens = self
            .gateway
            .login(email, password)
            .await
            .map_err(login_error)?;
        if let Err(error) = self.persist_tokens(&tokens) {
            self.discard_credentials();
            return Err(error);
        }

        let identity = match self.gateway.fetch_profile(&tokens.access).await {
            Ok(identity) => identity,
            Err(error) => {
                warn!(%error, "profile fetch failed after login; using minimal identity");
                Identity::minimal(email)
            }
        };
        // A credential must never outlive a failed login: roll the
        // store back rather than leave tokens without an identity.
        if let Err(error) = self.cache_identity(&identity) {
            self.discard_credentials();
            return Err(error);
        }
        self.write_state().identity = Some(identity.clone());
        debug!(email = identity.email(), role = %identity.role(), "login complete");
        Ok(identity)
    }

    /// Create an account, then sign it in.
    ///
    /// The remote API does not authenticate the caller on successful
    /// registration, so the gate always chains into [`Self::login`]
    /// with the same credentials. `name` is split into a first token
    /// and a joined remainder before submission.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        {
            let _pending = PendingGuard::hold(&self.state);
            let request = RegistrationRequest::from_display_name(name, email, password);
            debug!(email, "registration attempt");
            self.gateway
                .register(&request)
                .await
                .map_err(registration_error)?;
        }
        self.login(email, password).await
    }

    /// Clear the session and every durable trace of it.
    ///
    /// Synchronous, unconditional, never fails: store errors are
    /// logged and the in-memory identity is cleared regardless, so a
    /// later [`Self::bootstrap`] cannot resurrect the session.
    pub fn logout(&self) {
        self.write_state().identity = None;
        for key in [CACHED_IDENTITY_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(error) = self.store.remove(key) {
                warn!(key, %error, "failed to clear durable store entry during logout");
            }
        }
        debug!("session cleared");
    }

    /// Merge a display name and/or email into the current identity and
    /// rewrite the cached copy. Tokens are untouched.
    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity, SessionError> {
        let mut state = self.write_state();
        let Some(identity) = state.identity.as_mut() else {
            return Err(SessionError::authentication("no active session to update"));
        };
        if let Some(name) = update.display_name.as_deref() {
            identity.apply_display_name(name);
        }
        if let Some(email) = update.email.as_deref() {
            identity.set_email(email);
        }
        let updated = identity.clone();
        drop(state);
        self.cache_identity(&updated)?;
        Ok(updated)
    }

    /// Ask the remote API to start a password reset. Does not mutate
    /// the session.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        let _pending = PendingGuard::hold(&self.state);
        self.gateway
            .request_password_reset(email)
            .await
            .map_err(password_reset_error)
    }

    /// The stored access token, for collaborators that attach it to
    /// authenticated outbound requests.
    pub fn access_token(&self) -> Option<String> {
        match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "durable store unreadable while fetching access token");
                None
            }
        }
    }

    fn discard_credentials(&self) {
        for key in [CACHED_IDENTITY_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(error) = self.store.remove(key) {
                warn!(key, %error, "failed to roll back durable store entry");
            }
        }
    }

    fn persist_tokens(&self, tokens: &TokenPair) -> Result<(), SessionError> {
        self.store
            .put(ACCESS_TOKEN_KEY, &tokens.access)
            .map_err(store_error)?;
        self.store
            .put(REFRESH_TOKEN_KEY, &tokens.refresh)
            .map_err(store_error)
    }

    fn cache_identity(&self, identity: &Identity) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(identity).map_err(|error| {
            SessionError::authentication(format!("failed to encode session state: {error}"))
        })?;
        self.store
            .put(CACHED_IDENTITY_KEY, &encoded)
            .map_err(store_error)
    }
}

/// Scoped pending flag: set on construction, guaranteed to clear on
/// drop, including early error returns.
struct PendingGuard<'a> {
    state: &'a RwLock<Session>,
}

impl<'a> PendingGuard<'a> {
    fn hold(state: &'a RwLock<Session>) -> Self {
        state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pending = true;
        Self { state }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pending = false;
    }
}

fn login_error(error: AuthGatewayError) -> SessionError {
    match error {
        AuthGatewayError::Rejected { payload, .. } => {
            SessionError::authentication(login_rejection_message(&payload))
        }
        AuthGatewayError::Transport { message } | AuthGatewayError::Decode { message } => {
            SessionError::authentication(message)
        }
    }
}

fn registration_error(error: AuthGatewayError) -> SessionError {
    match error {
        AuthGatewayError::Rejected { payload, .. } => {
            SessionError::registration(registration_rejection_message(&payload))
        }
        AuthGatewayError::Transport { message } | AuthGatewayError::Decode { message } => {
            SessionError::registration(message)
        }
    }
}

fn password_reset_error(error: AuthGatewayError) -> SessionError {
    match error {
        AuthGatewayError::Rejected { payload, .. } => SessionError::authentication(
            payload
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(PASSWORD_RESET_FAILED),
        ),
        AuthGatewayError::Transport { message } | AuthGatewayError::Decode { message } => {
            SessionError::authentication(message)
        }
    }
}

fn store_error(error: CredentialStoreError) -> SessionError {
    SessionError::authentication(format!("failed to persist session state: {error}"))
}
