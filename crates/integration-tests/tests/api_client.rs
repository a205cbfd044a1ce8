//! Gateway behavior over real HTTP: envelopes, headers, error
//! classification, and the storage-lock retry.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;

use rahat_integration_tests::{StubResponse, StubServer, fixtures};
use rahat_storefront::api::{ApiClient, ApiError};
use rahat_storefront::backend::StorefrontBackend;
use rahat_storefront::storage::TokenStore;

fn client(server: &StubServer, token: Option<&str>) -> (ApiClient, TokenStore) {
    let tokens = TokenStore::in_memory();
    if let Some(token) = token {
        tokens.set_token(&SecretString::from(token));
    }
    let client = ApiClient::new(&server.config(), tokens.clone()).unwrap();
    (client, tokens)
}

#[tokio::test]
async fn test_data_envelope_is_unwrapped_and_bearer_sent() {
    let server = StubServer::start().await;
    server.on(
        "GET",
        "/products",
        StubResponse::data(json!([fixtures::product(1, "pubg-600", "9.99")])),
    );

    let (client, _) = client(&server, Some("tok_123"));
    let products = client.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products.first().unwrap().slug, "pubg-600");

    let request = server.requests_to("GET", "/products").pop().unwrap();
    assert_eq!(request.header("authorization"), Some("Bearer tok_123"));
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn test_bare_body_without_envelope_is_accepted() {
    let server = StubServer::start().await;
    server.on("GET", "/wallet", StubResponse::json(200, &fixtures::wallet("12.50")));

    let (client, _) = client(&server, Some("tok"));
    let wallet = client.wallet().await.unwrap();
    assert_eq!(wallet.balance.to_string(), "$12.50");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = StubServer::start().await;
    server.on("GET", "/product-categories", StubResponse::data(json!([])));

    let (client, _) = client(&server, None);
    client.categories().await.unwrap();

    let request = server.requests().pop().unwrap();
    assert!(request.header("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let server = StubServer::start().await;
    server.on("GET", "/user", StubResponse::error(401, "Unauthenticated."));

    let (client, tokens) = client(&server, Some("expired"));
    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(!tokens.has_token());
}

#[tokio::test]
async fn test_storage_lock_is_retried_until_success() {
    let server = StubServer::start().await;
    let locked = StubResponse::error(500, "SQLSTATE[HY000]: General error: 5 database is locked");
    server
        .on("GET", "/products/featured", locked.clone())
        .on("GET", "/products/featured", locked)
        .on("GET", "/products/featured", StubResponse::data(json!([])));

    let (client, _) = client(&server, None);
    assert!(client.featured_products().await.unwrap().is_empty());
    assert_eq!(server.requests_to("GET", "/products/featured").len(), 3);
}

#[tokio::test]
async fn test_storage_lock_gives_up_after_three_retries() {
    let server = StubServer::start().await;
    server.on("GET", "/blogs", StubResponse::error(500, "Database is locked"));

    let (client, _) = client(&server, None);
    let err = client.blog_posts().await.unwrap_err();

    assert!(matches!(err, ApiError::StorageLocked { status: 500, .. }));
    assert_eq!(server.requests_to("GET", "/blogs").len(), 4);
}

#[tokio::test]
async fn test_missing_rate_limiter_flags_critical_error() {
    let server = StubServer::start().await;
    server.on(
        "POST",
        "/coupon/validate",
        StubResponse::error(500, "Rate limiter [api] is not defined."),
    );

    let (client, tokens) = client(&server, None);
    let err = client.validate_coupon("RAHAT10").await.unwrap_err();

    assert!(matches!(err, ApiError::BackendMisconfigured { .. }));
    assert_eq!(
        tokens.critical_error().as_deref(),
        Some("Rate limiter [api] is not defined.")
    );
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_validation_errors_keep_field_messages() {
    let server = StubServer::start().await;
    server.on(
        "POST",
        "/coupon/validate",
        StubResponse::json(
            422,
            &json!({
                "message": "The selected code is invalid.",
                "errors": { "code": ["The selected code is invalid."] }
            }),
        ),
    );

    let (client, _) = client(&server, None);
    let err = client.validate_coupon("NOPE").await.unwrap_err();

    assert_eq!(err.to_string(), "The selected code is invalid.");
    assert_eq!(err.field_error("code"), Some("The selected code is invalid."));
    let request = server.requests().pop().unwrap();
    assert_eq!(request.body, Some(json!({ "code": "NOPE" })));
}

#[tokio::test]
async fn test_server_error_without_message_uses_fallback() {
    let server = StubServer::start().await;
    server.on("GET", "/pages", StubResponse::empty(503));

    let (client, _) = client(&server, None);
    let err = client.pages(false).await.unwrap_err();
    assert_eq!(err.to_string(), "Server Error: 503");
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let server = StubServer::start().await;
    server.on("POST", "/logout", StubResponse::empty(204));

    let (client, _) = client(&server, Some("tok"));
    client.logout().await.unwrap();
}

#[tokio::test]
async fn test_path_segments_are_encoded() {
    let server = StubServer::start().await;
    server.on(
        "GET",
        "/products/gift%20card",
        StubResponse::data(fixtures::product(4, "gift card", "25.00")),
    );

    let backend: Arc<dyn StorefrontBackend> = Arc::new(client(&server, None).0);
    let product = backend.product("gift card").await.unwrap();
    assert_eq!(product.id.as_i64(), 4);
}
