//! Mobile top-up command.

use rust_decimal::Decimal;

use rahat_core::{Money, PaymentMethod};
use rahat_storefront::topup::TopUpRequest;
use rahat_storefront::{Storefront, StorefrontError};

/// Top up `phone` by `amount` USD.
///
/// # Errors
///
/// Returns an error if the coupon or request is invalid, the wallet cannot
/// cover it, or the backend refuses it.
#[allow(clippy::print_stdout)]
pub async fn top_up(
    storefront: &Storefront,
    phone: &str,
    amount: Decimal,
    method: PaymentMethod,
    coupon: Option<&str>,
) -> Result<(), StorefrontError> {
    let mut request = TopUpRequest::new(phone, Money::usd(amount), method);
    if let Some(code) = coupon {
        request = request.with_coupon(storefront.coupon().apply(code).await?);
    }

    match request.operator() {
        Some(operator) => println!("operator: {operator}"),
        None => tracing::warn!(phone = %request.phone, "Unknown operator prefix"),
    }
    println!("total:    {}", storefront.display_price(request.summary().total));

    let receipt = storefront.top_up().submit(&request).await?;
    println!(
        "{}",
        receipt.message.as_deref().unwrap_or("Top-up submitted")
    );
    Ok(())
}
