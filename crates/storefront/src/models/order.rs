//! Order lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rahat_core::{CouponId, Money, OrderProductId, OrderStatus, PaymentMethod, ProductId};

use super::{Product, flexible_bool, lenient_timestamp};

/// One backend order record. Checkout creates one per cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub id: OrderProductId,
    pub pm_type: String,
    pub quantity: u32,
    pub total_price: Money,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_paid: bool,
    pub status: OrderStatus,
    pub product_id: ProductId,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub coupon_id: Option<CouponId>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product: Option<Product>,
}

/// Body of `POST /order-products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderProduct {
    pub product_id: ProductId,
    pub pm_type: &'static str,
    pub quantity: u32,
    pub total_price: Money,
}

impl NewOrderProduct {
    /// A single-unit order for `product_id` at `price`.
    #[must_use]
    pub const fn single(product_id: ProductId, payment: PaymentMethod, price: Money) -> Self {
        Self {
            product_id,
            pm_type: payment.tag(),
            quantity: 1,
            total_price: price,
        }
    }
}
