//! Coupon, checkout, and order history commands.

use rust_decimal::Decimal;

use rahat_core::{DiscountType, Money, PaymentMethod};
use rahat_storefront::checkout::{CheckoutError, CheckoutMetadata};
use rahat_storefront::pricing::CheckoutSummary;
use rahat_storefront::{Storefront, StorefrontError};

/// Arguments of `rahat checkout`.
#[derive(Debug)]
pub struct CheckoutArgs {
    pub slugs: Vec<String>,
    pub coupon: Option<String>,
    pub method: PaymentMethod,
    pub player_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Validate a coupon and, given a subtotal, show what it takes off.
///
/// # Errors
///
/// Returns an error if the code is empty or refused.
#[allow(clippy::print_stdout)]
pub async fn check_coupon(
    storefront: &Storefront,
    code: &str,
    subtotal: Option<Decimal>,
) -> Result<(), StorefrontError> {
    let coupon = storefront.coupon().apply(code).await?;
    let value = match coupon.discount_type {
        DiscountType::Percentage => format!("{}%", coupon.value),
        DiscountType::Fixed => storefront.display_price(Money::usd(coupon.value)),
    };
    println!("{} is valid: {value} off", coupon.code);

    if let Some(subtotal) = subtotal {
        print_summary(storefront, &CheckoutSummary::new(Money::usd(subtotal), Some(&coupon)));
    }
    Ok(())
}

/// Order the products named by `args.slugs`, one cart line per slug.
///
/// # Errors
///
/// Returns an error if a product cannot be found, the coupon is refused, or
/// the checkout fails. On a partial failure the orders that were created are
/// printed before the error is returned.
#[allow(clippy::print_stdout)]
pub async fn checkout(storefront: &Storefront, args: CheckoutArgs) -> Result<(), StorefrontError> {
    for slug in &args.slugs {
        let product = storefront.catalog().product(slug).await?;
        storefront.add_to_cart(product);
    }
    if let Some(code) = args.coupon.as_deref() {
        storefront.coupon().apply(code).await?;
    }

    let metadata = CheckoutMetadata {
        player_id: args.player_id,
        phone: args.phone,
        address: args.address,
    };
    let missing = storefront.checkout().plan().missing_fields(&metadata);
    if !missing.is_empty() {
        tracing::warn!(?missing, "Checkout details missing");
    }

    print_summary(storefront, &storefront.summary());

    match storefront.checkout().process_checkout(&metadata, args.method).await {
        Ok(outcome) => {
            for order in &outcome.orders {
                println!("order {} created ({})", order.id, order.status);
            }
            println!("{} order(s) placed", outcome.orders.len());
            Ok(())
        }
        Err(CheckoutError::PartialFailure {
            created,
            failed_line,
            source,
        }) => {
            for order in &created {
                println!("order {} created ({})", order.id, order.status);
            }
            Err(CheckoutError::PartialFailure {
                created,
                failed_line,
                source,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

/// List the signed-in user's orders.
///
/// # Errors
///
/// Returns an error if the request fails.
#[allow(clippy::print_stdout)]
pub async fn orders(storefront: &Storefront) -> Result<(), StorefrontError> {
    for order in storefront.checkout().order_history().await? {
        let product = order
            .product
            .as_ref()
            .map(|p| p.name(storefront.language()).to_string())
            .unwrap_or_else(|| format!("product {}", order.product_id));
        let status = order
            .status
            .label_key()
            .map_or_else(|| order.status.to_string(), |key| storefront.translate(key).to_string());
        println!(
            "{:<8} {:<12} {:<12} {}",
            order.id.to_string(),
            status,
            storefront.display_price(order.total_price),
            product
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(storefront: &Storefront, summary: &CheckoutSummary) {
    println!("subtotal: {}", storefront.display_price(summary.subtotal));
    if !summary.discount.is_zero() {
        println!("discount: -{}", storefront.display_price(summary.discount));
    }
    println!("total:    {}", storefront.display_price(summary.total));
}
