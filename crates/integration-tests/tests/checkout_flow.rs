//! End-to-end checkout: catalog lookup, coupon, wallet precondition, one
//! order per cart line.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;

use rahat_core::{Money, PaymentMethod};
use rahat_integration_tests::{StubResponse, StubServer, fixtures};
use rahat_storefront::Storefront;
use rahat_storefront::api::ApiClient;
use rahat_storefront::checkout::{CheckoutError, CheckoutMetadata};
use rahat_storefront::storage::TokenStore;

fn signed_in(server: &StubServer) -> Storefront {
    let tokens = TokenStore::in_memory();
    tokens.set_token(&SecretString::from("3|abc"));
    let backend = ApiClient::new(&server.config(), tokens.clone()).unwrap();
    Storefront::with_backend(server.config(), tokens, Arc::new(backend))
}

fn coupon_rahat10() -> StubResponse {
    StubResponse::data(json!({
        "id": 1,
        "code": "RAHAT10",
        "discountType": "PERCENTAGE",
        "value": "10"
    }))
}

async fn fill_cart(storefront: &Storefront, slugs: &[&str]) {
    for slug in slugs {
        let product = storefront.catalog().product(slug).await.unwrap();
        storefront.add_to_cart(product);
    }
}

#[tokio::test]
async fn test_wallet_checkout_with_coupon() {
    let server = StubServer::start().await;
    server
        .on("GET", "/products/pubg-600", StubResponse::data(fixtures::product(1, "pubg-600", "9.99")))
        .on("GET", "/products/gems-100", StubResponse::data(fixtures::product(2, "gems-100", "4.50")))
        .on("POST", "/coupon/validate", coupon_rahat10())
        .on("GET", "/wallet", StubResponse::data(fixtures::wallet("20.00")))
        .on("POST", "/order-products", StubResponse::data(fixtures::order(11, 1, "9.99")))
        .on("POST", "/order-products", StubResponse::data(fixtures::order(12, 2, "4.50")));

    let storefront = signed_in(&server);
    fill_cart(&storefront, &["pubg-600", "gems-100"]).await;
    storefront.coupon().apply("RAHAT10").await.unwrap();

    let summary = storefront.summary();
    assert_eq!(summary.total, Money::usd(Decimal::new(13041, 3)));
    assert_eq!(storefront.display_price(summary.total), "$13.04");

    let outcome = storefront
        .checkout()
        .process_checkout(&CheckoutMetadata::default(), PaymentMethod::Wallet)
        .await
        .unwrap();

    assert_eq!(outcome.orders.len(), 2);
    assert_eq!(storefront.cart_count(), 0);
    assert!(storefront.coupon().applied().is_none());

    let orders = server.requests_to("POST", "/order-products");
    let bodies: Vec<_> = orders.iter().map(|r| r.body.clone().unwrap()).collect();
    assert_eq!(bodies.first().unwrap()["product_id"], 1);
    assert_eq!(bodies.first().unwrap()["pm_type"], "wallet");
    assert_eq!(bodies.first().unwrap()["quantity"], 1);
    assert_eq!(bodies.get(1).unwrap()["product_id"], 2);

    // The wallet is refetched after checkout instead of adjusted locally.
    storefront.wallet().balance().await.unwrap();
    assert_eq!(server.requests_to("GET", "/wallet").len(), 2);
}

#[tokio::test]
async fn test_insufficient_balance_sends_no_orders() {
    let server = StubServer::start().await;
    server
        .on("GET", "/products/steam-50", StubResponse::data(fixtures::product(5, "steam-50", "50.00")))
        .on("GET", "/wallet", StubResponse::data(fixtures::wallet("12.00")));

    let storefront = signed_in(&server);
    fill_cart(&storefront, &["steam-50"]).await;

    let err = storefront
        .checkout()
        .process_checkout(&CheckoutMetadata::default(), PaymentMethod::Wallet)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::InsufficientBalance { .. }));
    assert!(server.requests_to("POST", "/order-products").is_empty());
    assert_eq!(storefront.cart_count(), 1);
}

#[tokio::test]
async fn test_partial_failure_keeps_unsubmitted_lines() {
    let server = StubServer::start().await;
    server
        .on("GET", "/products/pubg-600", StubResponse::data(fixtures::product(1, "pubg-600", "9.99")))
        .on("POST", "/order-products", StubResponse::data(fixtures::order(21, 1, "9.99")))
        .on(
            "POST",
            "/order-products",
            StubResponse::error(422, "The product is out of stock."),
        );

    let storefront = signed_in(&server);
    fill_cart(&storefront, &["pubg-600", "pubg-600", "pubg-600"]).await;
    let lines = storefront.cart_lines();

    let err = storefront
        .checkout()
        .process_checkout(&CheckoutMetadata::default(), PaymentMethod::Stripe)
        .await
        .unwrap_err();

    match err {
        CheckoutError::PartialFailure {
            created,
            failed_line,
            ..
        } => {
            assert_eq!(created.len(), 1);
            assert_eq!(failed_line, lines.get(1).unwrap().line_id);
        }
        other => panic!("expected a partial failure, got {other:?}"),
    }
    // Stops at the first failure; the third line is never submitted.
    assert_eq!(server.requests_to("POST", "/order-products").len(), 2);
    assert_eq!(storefront.cart_count(), 2);
}
