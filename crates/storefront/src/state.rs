//! Application state shared by every front end.

use std::sync::{Arc, Mutex};

use tracing::{info, instrument};

use rahat_core::{Currency, Language, Money, TenantId};

use crate::api::ApiClient;
use crate::backend::StorefrontBackend;
use crate::cart::{Cart, CartItem, CartLineId};
use crate::catalog::Catalog;
use crate::checkout::CheckoutComposer;
use crate::config::StorefrontConfig;
use crate::coupon::CouponResolver;
use crate::error::StorefrontError;
use crate::i18n;
use crate::media;
use crate::models::{Product, Tenant};
use crate::pricing::CheckoutSummary;
use crate::session::{Session, SessionState};
use crate::storage::{FileStorage, TokenStore, lock};
use crate::tenant::TenantSelection;
use crate::topup::TopUpService;
use crate::wallet::WalletService;

#[derive(Debug, Clone, Copy, Default)]
struct Preferences {
    language: Language,
    currency: Currency,
}

/// The storefront client as one value.
///
/// Every service shares a single backend and token store, so a 401 seen by
/// one of them is visible to all. This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    tokens: TokenStore,
    backend: Arc<dyn StorefrontBackend>,
    session: Arc<Session>,
    catalog: Catalog,
    cart: Arc<Mutex<Cart>>,
    coupon: Arc<CouponResolver>,
    wallet: Arc<WalletService>,
    checkout: CheckoutComposer,
    top_up: TopUpService,
    tenants: Mutex<TenantSelection>,
    preferences: Mutex<Preferences>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api_base_url", &self.inner.config.api_base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create the client over HTTP.
    ///
    /// The token store is file-backed when `config.state_file` is set and
    /// in-memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be opened or the HTTP client
    /// cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorefrontError> {
        let tokens = match &config.state_file {
            Some(path) => TokenStore::new(Arc::new(FileStorage::open(path)?)),
            None => TokenStore::in_memory(),
        };
        let client = ApiClient::new(&config, tokens.clone())?;
        Ok(Self::with_backend(config, tokens, Arc::new(client)))
    }

    /// Create the client over an arbitrary backend.
    #[must_use]
    pub fn with_backend(
        config: StorefrontConfig,
        tokens: TokenStore,
        backend: Arc<dyn StorefrontBackend>,
    ) -> Self {
        let session = Arc::new(Session::new(Arc::clone(&backend), tokens.clone()));
        let catalog = Catalog::new(Arc::clone(&backend), config.catalog_ttl);
        let cart = Arc::new(Mutex::new(Cart::new()));
        let coupon = Arc::new(CouponResolver::new(Arc::clone(&backend), Arc::clone(&session)));
        let wallet = Arc::new(WalletService::new(Arc::clone(&backend), Arc::clone(&session)));
        let checkout = CheckoutComposer::new(
            Arc::clone(&backend),
            Arc::clone(&cart),
            Arc::clone(&coupon),
            Arc::clone(&wallet),
            Arc::clone(&session),
        );
        let top_up = TopUpService::new(
            Arc::clone(&backend),
            Arc::clone(&wallet),
            Arc::clone(&session),
        );

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                tokens,
                backend,
                session,
                catalog,
                cart,
                coupon,
                wallet,
                checkout,
                top_up,
                tenants: Mutex::default(),
                preferences: Mutex::default(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The shared backend, for calls no service wraps.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorefrontBackend> {
        &self.inner.backend
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn coupon(&self) -> &CouponResolver {
        &self.inner.coupon
    }

    #[must_use]
    pub fn wallet(&self) -> &WalletService {
        &self.inner.wallet
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutComposer {
        &self.inner.checkout
    }

    #[must_use]
    pub fn top_up(&self) -> &TopUpService {
        &self.inner.top_up
    }

    /// Restore the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted token could not be exchanged for a
    /// user; the token is cleared in that case.
    pub async fn bootstrap(&self) -> Result<SessionState, StorefrontError> {
        Ok(self.inner.session.bootstrap().await?)
    }

    /// Sign out and drop everything tied to the user: wallet cache, cart,
    /// applied coupon, and tenant selection.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.inner.session.logout().await;
        self.inner.wallet.invalidate();
        lock(&self.inner.cart).clear();
        self.inner.coupon.remove();
        lock(&self.inner.tenants).reset();
        info!("Client state reset");
    }

    /// Append `product` as a new cart line.
    pub fn add_to_cart(&self, product: Product) -> CartLineId {
        lock(&self.inner.cart).add(product)
    }

    /// Remove one cart line.
    pub fn remove_from_cart(&self, line_id: CartLineId) -> Option<CartItem> {
        lock(&self.inner.cart).remove(line_id)
    }

    /// A snapshot of the cart lines.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartItem> {
        lock(&self.inner.cart).lines().to_vec()
    }

    #[must_use]
    pub fn cart_count(&self) -> usize {
        lock(&self.inner.cart).len()
    }

    /// The cart priced with the applied coupon.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        self.inner.checkout.summary()
    }

    #[must_use]
    pub fn language(&self) -> Language {
        lock(&self.inner.preferences).language
    }

    pub fn set_language(&self, language: Language) {
        lock(&self.inner.preferences).language = language;
    }

    #[must_use]
    pub fn currency(&self) -> Currency {
        lock(&self.inner.preferences).currency
    }

    pub fn set_currency(&self, currency: Currency) {
        lock(&self.inner.preferences).currency = currency;
    }

    /// `key` in the active language.
    #[must_use]
    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        i18n::translate(self.language(), key)
    }

    /// `price` in the active currency.
    #[must_use]
    pub fn display_price(&self, price: Money) -> String {
        self.currency().format(price)
    }

    /// Public URL of a stored media path.
    #[must_use]
    pub fn media_url(&self, path: Option<&str>) -> String {
        media::storage_url(&self.inner.config.storage_base_url, path)
    }

    /// The active legacy tenant, with the cached wallet balance when loaded.
    #[must_use]
    pub fn current_tenant(&self) -> Tenant {
        let user = self.inner.session.user_or_guest();
        let wallet = self.inner.wallet.cached();
        lock(&self.inner.tenants).current_tenant(&user, wallet.as_ref())
    }

    /// Switch the active legacy tenant.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Tenant` if the signed-in user has no tenant
    /// with that id.
    pub fn switch_tenant(&self, tenant_id: TenantId) -> Result<(), StorefrontError> {
        let user = self.inner.session.user_or_guest();
        lock(&self.inner.tenants).switch(&user, tenant_id)?;
        Ok(())
    }

    /// A flagged backend misconfiguration that should block the UI.
    #[must_use]
    pub fn critical_error(&self) -> Option<String> {
        self.inner.tokens.critical_error()
    }

    pub fn dismiss_critical_error(&self) {
        self.inner.tokens.dismiss_critical_error();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use rahat_core::DiscountType;

    use super::*;
    use crate::backend::MockStorefrontBackend;
    use crate::models::catalog::tests::product;
    use crate::pricing::tests::coupon;
    use crate::session::tests::user;

    fn storefront(backend: MockStorefrontBackend, tokens: TokenStore) -> Storefront {
        let config = StorefrontConfig::new("https://dashboard.rahatpay.com/api").unwrap();
        Storefront::with_backend(config, tokens, Arc::new(backend))
    }

    #[test]
    fn test_display_follows_active_preferences() {
        let storefront = storefront(MockStorefrontBackend::new(), TokenStore::in_memory());
        let price = Money::usd(Decimal::new(1449, 2));

        assert_eq!(storefront.display_price(price), "$14.49");
        assert_eq!(storefront.translate("nav_store"), "Store");

        storefront.set_currency(Currency::Afn);
        storefront.set_language(Language::Fa);
        assert_eq!(storefront.display_price(price), "1,086 ؋");
        assert_ne!(storefront.translate("nav_store"), "Store");
        assert_eq!(storefront.translate("missing.key"), "missing.key");
    }

    #[test]
    fn test_media_url_uses_storage_base() {
        let storefront = storefront(MockStorefrontBackend::new(), TokenStore::in_memory());
        assert_eq!(
            storefront.media_url(Some("blogs/cover.jpg")),
            "https://dashboard.rahatpay.com/storage/blogs/cover.jpg"
        );
    }

    #[tokio::test]
    async fn test_logout_resets_user_scoped_state() {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_current_user().returning(|| Ok(user("7")));
        backend.expect_validate_coupon().returning(|_| {
            Ok(coupon("RAHAT10", DiscountType::Percentage, Decimal::new(10, 0)))
        });
        backend.expect_logout().times(1).returning(|| Ok(()));

        let tokens = TokenStore::in_memory();
        tokens.set_token(&SecretString::from("tok"));
        let storefront = storefront(backend, tokens.clone());

        assert_eq!(storefront.bootstrap().await.unwrap(), SessionState::Authenticated);
        storefront.add_to_cart(product(1, "9.99"));
        storefront.coupon().apply("RAHAT10").await.unwrap();

        storefront.logout().await;

        assert!(!tokens.has_token());
        assert_eq!(storefront.cart_count(), 0);
        assert!(storefront.coupon().applied().is_none());
        assert_eq!(storefront.session().state(), SessionState::Unauthenticated);
        assert_eq!(storefront.current_tenant().name, "Default");
    }

    #[test]
    fn test_switch_to_unknown_tenant_is_rejected() {
        let storefront = storefront(MockStorefrontBackend::new(), TokenStore::in_memory());
        let err = storefront.switch_tenant(TenantId::new("t_missing")).unwrap_err();
        assert!(matches!(err, StorefrontError::Tenant(_)));
    }

    #[test]
    fn test_critical_error_passthrough() {
        let tokens = TokenStore::in_memory();
        tokens.flag_critical_error("Rate limiter [api] is not defined.");
        let storefront = storefront(MockStorefrontBackend::new(), tokens.clone());

        assert!(storefront.critical_error().is_some());
        storefront.dismiss_critical_error();
        assert!(storefront.critical_error().is_none());
    }
}
