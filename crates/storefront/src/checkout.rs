//! Checkout: turning the cart into backend orders.
//!
//! A checkout submits one order per cart line, strictly in cart order, each
//! with quantity 1 and the line's undiscounted price. Wallet payments are
//! checked against the discounted total before anything is submitted.
//!
//! The backend offers neither batch creation nor cancellation, so a failure
//! part-way through cannot be rolled back. It is reported as
//! [`CheckoutError::PartialFailure`] with the orders already created, and the
//! cart keeps the lines that were not ordered.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use rahat_core::{Money, PaymentMethod};

use crate::api::ApiError;
use crate::backend::StorefrontBackend;
use crate::cart::{Cart, CartItem, CartLineId};
use crate::coupon::CouponResolver;
use crate::error::{ErrorCategory, add_breadcrumb};
use crate::models::{NewOrderProduct, OrderProduct};
use crate::pricing::CheckoutSummary;
use crate::session::Session;
use crate::storage::lock;
use crate::wallet::WalletService;

/// Errors raised by [`CheckoutComposer::process_checkout`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Money, required: Money },

    /// The wallet balance could not be fetched for the precondition check.
    #[error("Could not read wallet balance: {0}")]
    BalanceUnavailable(#[source] ApiError),

    /// The first order failed; nothing was created.
    #[error("Order submission failed: {0}")]
    Submission(#[source] ApiError),

    /// Some orders were created before one failed.
    #[error("Order submission failed after {} orders were created: {source}", .created.len())]
    PartialFailure {
        created: Vec<OrderProduct>,
        failed_line: CartLineId,
        #[source]
        source: ApiError,
    },
}

impl CheckoutError {
    /// Where this error belongs in the UI's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyCart | Self::InsufficientBalance { .. } => ErrorCategory::Validation,
            Self::BalanceUnavailable(e) | Self::Submission(e) => e.category(),
            Self::PartialFailure { .. } => ErrorCategory::PartialCheckout,
        }
    }

    /// The gateway error behind this failure, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::BalanceUnavailable(e) | Self::Submission(e) => Some(e),
            Self::PartialFailure { source, .. } => Some(source),
            Self::EmptyCart | Self::InsufficientBalance { .. } => None,
        }
    }
}

/// Delivery details collected alongside the payment choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    /// In-game account id for game credit lines.
    pub player_id: Option<String>,
    /// Contact or recharge number for digital lines.
    pub phone: Option<String>,
    /// Shipping address for physical lines.
    pub address: Option<String>,
}

/// A cart's lines split by how they are delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulfillmentPlan {
    pub digital: Vec<CartLineId>,
    pub physical: Vec<CartLineId>,
}

impl FulfillmentPlan {
    /// Classify every line. Products whose category was not embedded count as
    /// digital.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let (physical, digital): (Vec<&CartItem>, Vec<&CartItem>) = cart
            .lines()
            .iter()
            .partition(|line| line.product.is_physical().unwrap_or(false));

        Self {
            digital: digital.iter().map(|l| l.line_id).collect(),
            physical: physical.iter().map(|l| l.line_id).collect(),
        }
    }

    /// Digital lines need a player id.
    #[must_use]
    pub fn needs_player_id(&self) -> bool {
        !self.digital.is_empty()
    }

    /// Digital lines need a phone number.
    #[must_use]
    pub fn needs_phone(&self) -> bool {
        !self.digital.is_empty()
    }

    /// Physical lines need a shipping address.
    #[must_use]
    pub fn needs_address(&self) -> bool {
        !self.physical.is_empty()
    }

    /// Names of the metadata fields this plan needs but `metadata` lacks.
    #[must_use]
    pub fn missing_fields(&self, metadata: &CheckoutMetadata) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

        let mut missing = Vec::new();
        if self.needs_player_id() && blank(&metadata.player_id) {
            missing.push("player_id");
        }
        if self.needs_phone() && blank(&metadata.phone) {
            missing.push("phone");
        }
        if self.needs_address() && blank(&metadata.address) {
            missing.push("address");
        }
        missing
    }
}

/// Result of a fully successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    /// One order per cart line, in cart order.
    pub orders: Vec<OrderProduct>,
    pub summary: CheckoutSummary,
}

/// Composes orders from the cart, the applied coupon, and the wallet.
pub struct CheckoutComposer {
    backend: Arc<dyn StorefrontBackend>,
    cart: Arc<Mutex<Cart>>,
    coupon: Arc<CouponResolver>,
    wallet: Arc<WalletService>,
    session: Arc<Session>,
}

impl std::fmt::Debug for CheckoutComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutComposer")
            .field("cart_lines", &lock(&self.cart).len())
            .finish_non_exhaustive()
    }
}

impl CheckoutComposer {
    #[must_use]
    pub fn new(
        backend: Arc<dyn StorefrontBackend>,
        cart: Arc<Mutex<Cart>>,
        coupon: Arc<CouponResolver>,
        wallet: Arc<WalletService>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            backend,
            cart,
            coupon,
            wallet,
            session,
        }
    }

    /// Price the current cart with the applied coupon.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        let subtotal = lock(&self.cart).subtotal();
        CheckoutSummary::new(subtotal, self.coupon.applied().as_ref())
    }

    /// Fulfillment split of the current cart.
    #[must_use]
    pub fn plan(&self) -> FulfillmentPlan {
        FulfillmentPlan::from_cart(&lock(&self.cart))
    }

    /// Submit the cart.
    ///
    /// On success the submitted lines are removed rather than the whole cart
    /// cleared, so a line added while the checkout runs stays in the cart.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` when there is nothing to order
    /// - `CheckoutError::InsufficientBalance` when paying from a wallet that
    ///   cannot cover the total; no order is submitted
    /// - `CheckoutError::BalanceUnavailable` when the wallet could not be read
    /// - `CheckoutError::Submission` when the first order fails
    /// - `CheckoutError::PartialFailure` when a later order fails
    #[instrument(
        skip(self, metadata),
        fields(payment_method = %payment_method, line_count = tracing::field::Empty)
    )]
    pub async fn process_checkout(
        &self,
        metadata: &CheckoutMetadata,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let lines: Vec<CartItem> = lock(&self.cart).lines().to_vec();
        tracing::Span::current().record("line_count", lines.len());
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let subtotal: Money = lines.iter().map(CartItem::price).sum();
        let summary = CheckoutSummary::new(subtotal, self.coupon.applied().as_ref());

        if payment_method == PaymentMethod::Wallet {
            let balance = self
                .wallet
                .balance()
                .await
                .map_err(CheckoutError::BalanceUnavailable)?;
            if balance < summary.total {
                return Err(CheckoutError::InsufficientBalance {
                    balance,
                    required: summary.total,
                });
            }
        }

        info!(
            total = %summary.total,
            player_id = metadata.player_id.as_deref().unwrap_or_default(),
            has_address = metadata.address.is_some(),
            "Submitting checkout"
        );
        add_breadcrumb(
            "checkout",
            "Checkout started",
            Some(&[("payment_method", payment_method.tag())]),
        );

        let mut created: Vec<OrderProduct> = Vec::with_capacity(lines.len());
        for line in &lines {
            let order = NewOrderProduct::single(line.product_id(), payment_method, line.price());
            match self.backend.create_order_product(order).await {
                Ok(order) => created.push(order),
                Err(source) => {
                    self.settle(lines.get(..created.len()).unwrap_or_default());
                    warn!(
                        created = created.len(),
                        failed_line = %line.line_id,
                        error = %source,
                        "Checkout stopped part-way"
                    );
                    let err = if created.is_empty() {
                        CheckoutError::Submission(source)
                    } else {
                        CheckoutError::PartialFailure {
                            created,
                            failed_line: line.line_id,
                            source,
                        }
                    };
                    return Err(self.observed(err));
                }
            }
        }

        self.settle(&lines);
        self.coupon.remove();
        add_breadcrumb("checkout", "Checkout completed", None);
        info!(orders = created.len(), "Checkout completed");

        Ok(CheckoutOutcome {
            orders: created,
            summary,
        })
    }

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn order_history(&self) -> Result<Vec<OrderProduct>, ApiError> {
        self.backend.order_products().await.inspect_err(|e| {
            self.session.observe(e);
        })
    }

    /// Drop the lines that became orders and invalidate the caches those
    /// orders affect.
    fn settle(&self, submitted: &[CartItem]) {
        if submitted.is_empty() {
            return;
        }
        {
            let mut cart = lock(&self.cart);
            for line in submitted {
                cart.remove(line.line_id);
            }
        }
        self.wallet.invalidate();
        self.session.invalidate();
    }

    fn observed(&self, err: CheckoutError) -> CheckoutError {
        if let Some(api) = err.api_error() {
            self.session.observe(api);
        }
        err
    }
}
