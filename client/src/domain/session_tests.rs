//! Tests for the session and access gate.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use super::error::{LOGIN_FAILED, SessionError};
use super::identity::{Identity, Role};
use super::ports::{
    ACCESS_TOKEN_KEY, AuthGatewayError, CACHED_IDENTITY_KEY, CredentialStore,
    CredentialStoreError, MemoryCredentialStore, MockAuthGateway, MockCredentialStore,
    REFRESH_TOKEN_KEY, TokenPair,
};
use super::routing::{Route, RouteDecision};
use super::session::{ProfileUpdate, SessionService};

fn token_pair() -> TokenPair {
    TokenPair {
        access: "access-1".to_owned(),
        refresh: "refresh-1".to_owned(),
    }
}

fn make_service(
    gateway: MockAuthGateway,
    store: Arc<MemoryCredentialStore>,
) -> SessionService<MockAuthGateway, MemoryCredentialStore> {
    SessionService::new(Arc::new(gateway), store)
}

#[tokio::test]
async fn login_installs_identity_and_persists_tokens() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    let profile = Identity::minimal("a@b.com")
        .with_name("Jane", "Doe")
        .with_role(Role::User);
    let returned = profile.clone();
    gateway
        .expect_fetch_profile()
        .times(1)
        .withf(|token| token == "access-1")
        .returning(move |_| Ok(returned.clone()));

    let store = Arc::new(MemoryCredentialStore::new());
    let service = make_service(gateway, Arc::clone(&store));

    let identity = service.login("a@b.com", "pw").await.expect("login succeeds");
    assert_eq!(identity.email(), "a@b.com");
    assert_eq!(service.identity(), Some(profile));
    assert_eq!(
        store.get(ACCESS_TOKEN_KEY).expect("store read"),
        Some("access-1".to_owned())
    );
    assert_eq!(
        store.get(REFRESH_TOKEN_KEY).expect("store read"),
        Some("refresh-1".to_owned())
    );
    assert!(store.get(CACHED_IDENTITY_KEY).expect("store read").is_some());
    assert!(!service.is_pending());
}

#[tokio::test]
async fn rejected_login_surfaces_the_detail_message() {
    let mut gateway = MockAuthGateway::new();
    gateway.expect_login().times(1).returning(|_, _| {
        Err(AuthGatewayError::rejected(
            401,
            json!({ "detail": "No active account found with the given credentials" }),
        ))
    });

    let store = Arc::new(MemoryCredentialStore::new());
    let service = make_service(gateway, Arc::clone(&store));

    let error = service.login("a@b.com", "bad").await.expect_err("login fails");
    assert_eq!(
        error,
        SessionError::authentication("No active account found with the given credentials")
    );
    assert_eq!(service.identity(), None);
    assert_eq!(store.get(ACCESS_TOKEN_KEY).expect("store read"), None);
    assert!(!service.is_pending());
}

#[tokio::test]
async fn rejected_login_without_detail_uses_the_generic_message() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Err(AuthGatewayError::rejected_opaque(502)));

    let service = make_service(gateway, Arc::new(MemoryCredentialStore::new()));

    let error = service.login("a@b.com", "pw").await.expect_err("login fails");
    assert_eq!(error.message(), LOGIN_FAILED);
}

#[tokio::test]
async fn transport_failure_surfaces_its_own_message() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Err(AuthGatewayError::transport("connection refused")));

    let service = make_service(gateway, Arc::new(MemoryCredentialStore::new()));

    let error = service.login("a@b.com", "pw").await.expect_err("login fails");
    assert_eq!(error.message(), "connection refused");
}

#[tokio::test]
async fn failed_profile_fetch_degrades_to_a_minimal_identity() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    gateway
        .expect_fetch_profile()
        .times(1)
        .returning(|_| Err(AuthGatewayError::rejected_opaque(500)));

    let store = Arc::new(MemoryCredentialStore::new());
    let service = make_service(gateway, Arc::clone(&store));

    let identity = service.login("a@b.com", "pw").await.expect("login succeeds");
    assert_eq!(identity, Identity::minimal("a@b.com"));
    // The degraded identity is still cached for the next bootstrap.
    let cached = store
        .get(CACHED_IDENTITY_KEY)
        .expect("store read")
        .expect("identity cached");
    let decoded: Identity = serde_json::from_str(&cached).expect("cached identity decodes");
    assert_eq!(decoded.email(), "a@b.com");
}

#[tokio::test]
async fn logout_then_bootstrap_yields_an_anonymous_session() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    gateway
        .expect_fetch_profile()
        .times(1)
        .returning(|_| Ok(Identity::minimal("a@b.com")));

    let store = Arc::new(MemoryCredentialStore::new());
    let service = make_service(gateway, Arc::clone(&store));
    service.login("a@b.com", "pw").await.expect("login succeeds");

    service.logout();
    assert_eq!(service.identity(), None);
    for key in [CACHED_IDENTITY_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
        assert_eq!(store.get(key).expect("store read"), None, "key {key}");
    }

    // A fresh gate over the same store must not resurrect anything.
    let revived = make_service(MockAuthGateway::new(), Arc::clone(&store));
    assert_eq!(revived.bootstrap(), None);
    assert_eq!(revived.identity(), None);
}

#[tokio::test]
async fn bootstrap_restores_the_logged_in_identity_without_network_calls() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    let profile = Identity::minimal("ada@example.com")
        .with_name("Ada", "Lovelace")
        .with_role(Role::Analyst);
    let returned = profile.clone();
    gateway
        .expect_fetch_profile()
        .times(1)
        .returning(move |_| Ok(returned.clone()));

    let store = Arc::new(MemoryCredentialStore::new());
    let service = make_service(gateway, Arc::clone(&store));
    let installed = service
        .login("ada@example.com", "pw")
        .await
        .expect("login succeeds");

    // A mock with no expectations panics on any call, so a clean pass
    // proves bootstrap stays off the network.
    let restored_service = make_service(MockAuthGateway::new(), Arc::clone(&store));
    let restored = restored_service.bootstrap().expect("identity restored");
    assert_eq!(restored, installed);
    assert_eq!(restored_service.identity(), Some(installed));
}

#[tokio::test]
async fn bootstrap_ignores_an_undecodable_cache_entry() {
    let store = Arc::new(MemoryCredentialStore::new());
    store
        .put(CACHED_IDENTITY_KEY, "not json")
        .expect("store write");

    let service = make_service(MockAuthGateway::new(), Arc::clone(&store));
    assert_eq!(service.bootstrap(), None);
    assert_eq!(service.identity(), None);
}

#[tokio::test]
async fn registration_always_chains_into_login() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_register()
        .times(1)
        .withf(|request| {
            request.email == "a@b.com"
                && request.first_name == "Jane"
                && request.last_name == "Doe"
        })
        .returning(|_| Ok(()));
    gateway
        .expect_login()
        .times(1)
        .withf(|email, password| email == "a@b.com" && password == "pw")
        .returning(|_, _| Ok(token_pair()));
    gateway
        .expect_fetch_profile()
        .times(1)
        .returning(|_| Ok(Identity::minimal("a@b.com")));

    let service = make_service(gateway, Arc::new(MemoryCredentialStore::new()));

    let identity = service
        .register("Jane Doe", "a@b.com", "pw")
        .await
        .expect("registration succeeds");
    assert_eq!(identity.email(), "a@b.com");
    assert!(!service.is_pending());
}

#[rstest]
#[case(
    json!({ "email": ["A user with this email already exists."] }),
    "A user with this email already exists."
)]
#[case(json!({ "flagged": true }), "{\"flagged\":true}")]
#[tokio::test]
async fn rejected_registration_surfaces_the_derived_message(
    #[case] payload: serde_json::Value,
    #[case] expected: &str,
) {
    let mut gateway = MockAuthGateway::new();
    let rejection = AuthGatewayError::rejected(400, payload);
    gateway
        .expect_register()
        .times(1)
        .returning(move |_| Err(rejection.clone()));

    let service = make_service(gateway, Arc::new(MemoryCredentialStore::new()));

    let error = service
        .register("Jane Doe", "a@b.com", "pw")
        .await
        .expect_err("registration fails");
    assert_eq!(error, SessionError::registration(expected));
    assert!(!service.is_pending());
}

#[tokio::test]
async fn authorize_reflects_the_installed_identity() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    gateway
        .expect_fetch_profile()
        .times(1)
        .returning(|_| Ok(Identity::minimal("an@example.com").with_role(Role::Analyst)));

    let service = make_service(gateway, Arc::new(MemoryCredentialStore::new()));
    assert_eq!(
        service.authorize(&[Role::Admin]),
        RouteDecision::RedirectToLogin
    );

    service.login("an@example.com", "pw").await.expect("login succeeds");
    assert_eq!(
        service.authorize(&[Role::Admin]),
        RouteDecision::Redirect(Route::Analysis)
    );
    assert_eq!(service.authorize(&[]), RouteDecision::Allow);
}

#[tokio::test]
async fn update_profile_rewrites_only_the_cached_identity() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    gateway
        .expect_fetch_profile()
        .times(1)
        .returning(|_| Ok(Identity::minimal("a@b.com").with_name("Jane", "Doe")));

    let store = Arc::new(MemoryCredentialStore::new());
    let service = make_service(gateway, Arc::clone(&store));
    service.login("a@b.com", "pw").await.expect("login succeeds");

    let updated = service
        .update_profile(&ProfileUpdate {
            display_name: Some("Janet Q Doe".to_owned()),
            email: None,
        })
        .expect("profile update succeeds");
    assert_eq!(updated.first_name(), "Janet");
    assert_eq!(updated.last_name(), "Q Doe");
    assert_eq!(updated.email(), "a@b.com");

    // Tokens survive untouched; only the cached identity changes.
    assert_eq!(
        store.get(ACCESS_TOKEN_KEY).expect("store read"),
        Some("access-1".to_owned())
    );
    assert_eq!(
        store.get(REFRESH_TOKEN_KEY).expect("store read"),
        Some("refresh-1".to_owned())
    );
    let cached = store
        .get(CACHED_IDENTITY_KEY)
        .expect("store read")
        .expect("identity cached");
    let decoded: Identity = serde_json::from_str(&cached).expect("cached identity decodes");
    assert_eq!(decoded, updated);
}

#[test]
fn update_profile_without_a_session_is_rejected() {
    let service = make_service(MockAuthGateway::new(), Arc::new(MemoryCredentialStore::new()));
    let error = service
        .update_profile(&ProfileUpdate::default())
        .expect_err("no session to update");
    assert_eq!(error.message(), "no active session to update");
}

#[tokio::test]
async fn password_reset_maps_rejections_to_display_messages() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_request_password_reset()
        .times(1)
        .returning(|_| {
            Err(AuthGatewayError::rejected(
                400,
                json!({ "detail": "Unknown email" }),
            ))
        });

    let service = make_service(gateway, Arc::new(MemoryCredentialStore::new()));
    let error = service
        .request_password_reset("a@b.com")
        .await
        .expect_err("reset fails");
    assert_eq!(error.message(), "Unknown email");
    assert!(!service.is_pending());
}

#[tokio::test]
async fn failed_token_persistence_rolls_the_store_back_and_fails_login() {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(token_pair()));
    // No fetch_profile expectation: reaching the profile fetch after a
    // failed persist would panic the mock.

    let mut store = MockCredentialStore::new();
    store
        .expect_put()
        .times(1)
        .returning(|_, _| Err(CredentialStoreError::write("disk full")));
    store.expect_remove().times(3).returning(|_| Ok(()));

    let service = SessionService::new(Arc::new(gateway), Arc::new(store));
    let error = service.login("a@b.com", "pw").await.expect_err("login fails");
    assert!(error.message().contains("failed to persist session state"));
    assert_eq!(service.identity(), None);
    assert!(!service.is_pending());
}

#[test]
fn access_token_reads_the_durable_store() {
    let store = Arc::new(MemoryCredentialStore::new());
    store.put(ACCESS_TOKEN_KEY, "tok").expect("store write");
    let service = make_service(MockAuthGateway::new(), Arc::clone(&store));
    assert_eq!(service.access_token(), Some("tok".to_owned()));
}
