//! The storefront backend as a service trait.
//!
//! [`StorefrontBackend`] lists every REST operation the client uses. The
//! production implementation is [`ApiClient`]; tests script the generated
//! `MockStorefrontBackend` instead.

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use tracing::instrument;

use rahat_core::Money;

use crate::api::{ApiClient, ApiError};
use crate::models::{
    AuthResponse, BlogPost, Coupon, LoginCredentials, NewOrderProduct, OrderProduct, Page,
    Product, ProductCategory, ProfileUpdate, RegisterData, TopUpReceipt, TopUpSubmission, User,
    Wallet, WalletCredit, WalletMovement, WalletTransaction,
};

#[automock]
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// `POST /login`.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthResponse, ApiError>;

    /// `POST /register`.
    async fn register(&self, data: RegisterData) -> Result<AuthResponse, ApiError>;

    /// `POST /logout`.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET /user`.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// `PUT /user/profile`.
    async fn update_profile(&self, patch: ProfileUpdate) -> Result<User, ApiError>;

    /// `POST /email/verify`.
    async fn verify_email(&self) -> Result<(), ApiError>;

    /// `GET /wallet`.
    async fn wallet(&self) -> Result<Wallet, ApiError>;

    /// `GET /wallet/transactions`.
    async fn wallet_transactions(&self) -> Result<Vec<WalletTransaction>, ApiError>;

    /// `POST /wallet/credit`.
    async fn credit_wallet(&self, amount: Money, pm_type: &str)
    -> Result<WalletCredit, ApiError>;

    /// `POST /wallet/debit`.
    async fn debit_wallet(&self, amount: Money, pm_type: &str) -> Result<WalletCredit, ApiError>;

    /// `GET /products`.
    async fn products(&self) -> Result<Vec<Product>, ApiError>;

    /// `GET /products/featured`.
    async fn featured_products(&self) -> Result<Vec<Product>, ApiError>;

    /// `GET /products/{slug}`.
    async fn product(&self, slug: &str) -> Result<Product, ApiError>;

    /// `GET /product-categories`.
    async fn categories(&self) -> Result<Vec<ProductCategory>, ApiError>;

    /// `GET /product-categories/{slug}/products`.
    async fn category_products(&self, slug: &str) -> Result<Vec<Product>, ApiError>;

    /// `GET /order-products`.
    async fn order_products(&self) -> Result<Vec<OrderProduct>, ApiError>;

    /// `POST /order-products`.
    async fn create_order_product(&self, order: NewOrderProduct)
    -> Result<OrderProduct, ApiError>;

    /// `GET /blogs`.
    async fn blog_posts(&self) -> Result<Vec<BlogPost>, ApiError>;

    /// `GET /blogs/{id_or_slug}`.
    async fn blog_post(&self, id_or_slug: &str) -> Result<BlogPost, ApiError>;

    /// `GET /pages`, or `GET /pages?featured=1` when `featured` is set.
    async fn pages(&self, featured: bool) -> Result<Vec<Page>, ApiError>;

    /// `GET /pages/{slug}`.
    async fn page(&self, slug: &str) -> Result<Page, ApiError>;

    /// `POST /coupon/validate`.
    async fn validate_coupon(&self, code: &str) -> Result<Coupon, ApiError>;

    /// `POST /top-ups`.
    async fn create_top_up(&self, submission: TopUpSubmission)
    -> Result<TopUpReceipt, ApiError>;
}

/// Percent-encode one path segment.
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[async_trait]
impl StorefrontBackend for ApiClient {
    #[instrument(skip(self, credentials))]
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthResponse, ApiError> {
        self.post("/login", &credentials).await
    }

    #[instrument(skip(self, data))]
    async fn register(&self, data: RegisterData) -> Result<AuthResponse, ApiError> {
        self.post("/register", &data).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty::<Value>("/logout").await.map(drop)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/user").await
    }

    async fn update_profile(&self, patch: ProfileUpdate) -> Result<User, ApiError> {
        self.put("/user/profile", &patch).await
    }

    async fn verify_email(&self) -> Result<(), ApiError> {
        self.post_empty::<Value>("/email/verify").await.map(drop)
    }

    async fn wallet(&self) -> Result<Wallet, ApiError> {
        self.get("/wallet").await
    }

    async fn wallet_transactions(&self) -> Result<Vec<WalletTransaction>, ApiError> {
        self.get("/wallet/transactions").await
    }

    async fn credit_wallet(
        &self,
        amount: Money,
        pm_type: &str,
    ) -> Result<WalletCredit, ApiError> {
        self.post("/wallet/credit", &WalletMovement { amount, pm_type })
            .await
    }

    async fn debit_wallet(&self, amount: Money, pm_type: &str) -> Result<WalletCredit, ApiError> {
        self.post("/wallet/debit", &WalletMovement { amount, pm_type })
            .await
    }

    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products").await
    }

    async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products/featured").await
    }

    async fn product(&self, slug: &str) -> Result<Product, ApiError> {
        self.get(&format!("/products/{}", segment(slug))).await
    }

    async fn categories(&self) -> Result<Vec<ProductCategory>, ApiError> {
        self.get("/product-categories").await
    }

    async fn category_products(&self, slug: &str) -> Result<Vec<Product>, ApiError> {
        self.get(&format!("/product-categories/{}/products", segment(slug)))
            .await
    }

    async fn order_products(&self) -> Result<Vec<OrderProduct>, ApiError> {
        self.get("/order-products").await
    }

    async fn create_order_product(
        &self,
        order: NewOrderProduct,
    ) -> Result<OrderProduct, ApiError> {
        self.post("/order-products", &order).await
    }

    async fn blog_posts(&self) -> Result<Vec<BlogPost>, ApiError> {
        self.get("/blogs").await
    }

    async fn blog_post(&self, id_or_slug: &str) -> Result<BlogPost, ApiError> {
        self.get(&format!("/blogs/{}", segment(id_or_slug))).await
    }

    async fn pages(&self, featured: bool) -> Result<Vec<Page>, ApiError> {
        if featured {
            self.get("/pages?featured=1").await
        } else {
            self.get("/pages").await
        }
    }

    async fn page(&self, slug: &str) -> Result<Page, ApiError> {
        self.get(&format!("/pages/{}", segment(slug))).await
    }

    async fn validate_coupon(&self, code: &str) -> Result<Coupon, ApiError> {
        self.post("/coupon/validate", &serde_json::json!({ "code": code }))
            .await
    }

    async fn create_top_up(
        &self,
        submission: TopUpSubmission,
    ) -> Result<TopUpReceipt, ApiError> {
        let receipt: Option<TopUpReceipt> = self.post("/top-ups", &submission).await?;
        Ok(receipt.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("pubg-mobile-600-uc"), "pubg-mobile-600-uc");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
