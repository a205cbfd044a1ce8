//! Checkout arithmetic. Everything here is USD; currency only affects display.

use serde::Serialize;

use rahat_core::{Currency, DiscountType, Money};

use crate::models::Coupon;

/// Discount `coupon` grants on `subtotal`.
///
/// Percentage coupons take `value`% of the subtotal; fixed coupons take
/// `value` dollars. The discount itself is not capped; [`CheckoutSummary`]
/// floors the total instead.
#[must_use]
pub fn discount_for(coupon: &Coupon, subtotal: Money) -> Money {
    match coupon.discount_type {
        DiscountType::Percentage => subtotal.percent(coupon.value),
        DiscountType::Fixed => Money::usd(coupon.value),
    }
}

/// Priced totals of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub discount: Money,
    /// `max(0, subtotal - discount)`.
    pub total: Money,
}

impl CheckoutSummary {
    /// Price `subtotal` with an optional coupon.
    #[must_use]
    pub fn new(subtotal: Money, coupon: Option<&Coupon>) -> Self {
        let discount = coupon.map_or(Money::ZERO, |c| discount_for(c, subtotal));
        Self {
            subtotal,
            discount,
            total: subtotal.saturating_sub(discount),
        }
    }

    /// The total rendered in `currency`.
    #[must_use]
    pub fn display_total(&self, currency: Currency) -> String {
        self.total.display(currency)
    }
}
