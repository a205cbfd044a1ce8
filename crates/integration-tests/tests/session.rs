//! Session lifecycle against the stub backend.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use rahat_core::{Money, PaymentMethod};

use rahat_integration_tests::{StubResponse, StubServer, fixtures};
use rahat_storefront::Storefront;
use rahat_storefront::models::LoginCredentials;
use rahat_storefront::session::SessionState;
use rahat_storefront::storage::{FileStorage, TokenStore};
use rahat_storefront::topup::TopUpRequest;

fn storefront_with(server: &StubServer, tokens: TokenStore) -> Storefront {
    let backend = rahat_storefront::api::ApiClient::new(&server.config(), tokens.clone()).unwrap();
    Storefront::with_backend(server.config(), tokens, std::sync::Arc::new(backend))
}

#[tokio::test]
async fn test_login_persists_token_for_later_requests() {
    let server = StubServer::start().await;
    server
        .on(
            "POST",
            "/login",
            StubResponse::json(200, &json!({ "user": fixtures::user(3), "token": "3|abc" })),
        )
        .on("GET", "/wallet", StubResponse::data(fixtures::wallet("40.00")));

    let tokens = TokenStore::in_memory();
    let storefront = storefront_with(&server, tokens.clone());

    let creds = LoginCredentials::new("alex@example.com", "hunter22").unwrap();
    let user = storefront.session().login(creds).await.unwrap();
    assert_eq!(user.name, "Alex Karimi");
    assert_eq!(tokens.token().unwrap().expose_secret(), "3|abc");

    let login = server.requests_to("POST", "/login").pop().unwrap();
    assert!(login.header("authorization").is_none());
    assert_eq!(
        login.body,
        Some(json!({ "email": "alex@example.com", "password": "hunter22" }))
    );

    storefront.wallet().balance().await.unwrap();
    let wallet = server.requests_to("GET", "/wallet").pop().unwrap();
    assert_eq!(wallet.header("authorization"), Some("Bearer 3|abc"));
}

#[tokio::test]
async fn test_persisted_token_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");

    let server = StubServer::start().await;
    server.on("GET", "/user", StubResponse::data(fixtures::user(3)));

    {
        let tokens = TokenStore::new(std::sync::Arc::new(FileStorage::open(&state_file).unwrap()));
        tokens.set_token(&SecretString::from("3|persisted"));
    }

    let mut config = server.config();
    config.state_file = Some(state_file);
    let storefront = Storefront::new(config).unwrap();

    assert_eq!(storefront.session().state(), SessionState::Loading);
    assert_eq!(
        storefront.bootstrap().await.unwrap(),
        SessionState::Authenticated
    );
    let request = server.requests_to("GET", "/user").pop().unwrap();
    assert_eq!(request.header("authorization"), Some("Bearer 3|persisted"));
}

#[tokio::test]
async fn test_revoked_token_demotes_to_guest() {
    let server = StubServer::start().await;
    server.on("GET", "/user", StubResponse::error(401, "Unauthenticated."));

    let tokens = TokenStore::in_memory();
    tokens.set_token(&SecretString::from("revoked"));
    let storefront = storefront_with(&server, tokens.clone());

    assert!(storefront.bootstrap().await.is_err());
    assert_eq!(storefront.session().state(), SessionState::Unauthenticated);
    assert!(storefront.session().user_or_guest().is_guest());
    assert!(!tokens.has_token());
}

#[tokio::test]
async fn test_logout_clears_local_state_even_if_backend_fails() {
    let server = StubServer::start().await;
    server
        .on("GET", "/user", StubResponse::data(fixtures::user(3)))
        .on("POST", "/logout", StubResponse::error(500, "Server Error"));

    let tokens = TokenStore::in_memory();
    tokens.set_token(&SecretString::from("3|abc"));
    let storefront = storefront_with(&server, tokens.clone());
    storefront.bootstrap().await.unwrap();

    storefront.logout().await;

    assert_eq!(server.requests_to("POST", "/logout").len(), 1);
    assert!(!tokens.has_token());
    assert!(!storefront.session().is_authenticated());
}

async fn signed_in(server: &StubServer) -> (Storefront, TokenStore) {
    server.on("GET", "/user", StubResponse::data(fixtures::user(3)));
    let tokens = TokenStore::in_memory();
    tokens.set_token(&SecretString::from("3|abc"));
    let storefront = storefront_with(server, tokens.clone());
    assert_eq!(
        storefront.bootstrap().await.unwrap(),
        SessionState::Authenticated
    );
    (storefront, tokens)
}

fn assert_signed_out(storefront: &Storefront, tokens: &TokenStore) {
    assert!(!tokens.has_token());
    assert!(!storefront.session().is_authenticated());
    assert_eq!(storefront.session().state(), SessionState::Unauthenticated);
    assert!(storefront.session().user_or_guest().is_guest());
}

#[tokio::test]
async fn test_wallet_401_signs_out() {
    let server = StubServer::start().await;
    server.on("GET", "/wallet", StubResponse::error(401, "Unauthenticated."));
    let (storefront, tokens) = signed_in(&server).await;

    assert!(storefront.wallet().balance().await.unwrap_err().is_unauthorized());
    assert_signed_out(&storefront, &tokens);
}

#[tokio::test]
async fn test_wallet_transactions_401_signs_out() {
    let server = StubServer::start().await;
    server.on(
        "GET",
        "/wallet/transactions",
        StubResponse::error(401, "Unauthenticated."),
    );
    let (storefront, tokens) = signed_in(&server).await;

    assert!(storefront.wallet().transactions().await.is_err());
    assert_signed_out(&storefront, &tokens);
}

#[tokio::test]
async fn test_coupon_validation_401_signs_out() {
    let server = StubServer::start().await;
    server.on(
        "POST",
        "/coupon/validate",
        StubResponse::error(401, "Unauthenticated."),
    );
    let (storefront, tokens) = signed_in(&server).await;

    assert!(storefront.coupon().apply("RAHAT10").await.is_err());
    assert!(storefront.coupon().applied().is_none());
    assert_signed_out(&storefront, &tokens);
}

#[tokio::test]
async fn test_top_up_401_signs_out() {
    let server = StubServer::start().await;
    server.on("POST", "/top-ups", StubResponse::error(401, "Unauthenticated."));
    let (storefront, tokens) = signed_in(&server).await;

    let request = TopUpRequest::new(
        "0791234567",
        Money::usd(Decimal::new(10, 0)),
        PaymentMethod::Stripe,
    );
    assert!(storefront.top_up().submit(&request).await.is_err());
    assert_eq!(server.requests_to("POST", "/top-ups").len(), 1);
    assert_signed_out(&storefront, &tokens);
}
