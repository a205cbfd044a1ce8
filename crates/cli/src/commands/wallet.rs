//! Wallet commands.

use rust_decimal::Decimal;

use rahat_core::{Money, PaymentMethod};
use rahat_storefront::{Storefront, StorefrontError};

/// Print the wallet balance.
///
/// # Errors
///
/// Returns an error if the wallet could not be fetched.
#[allow(clippy::print_stdout)]
pub async fn balance(storefront: &Storefront) -> Result<(), StorefrontError> {
    let balance = storefront.wallet().balance().await?;
    println!("{}", storefront.display_price(balance));
    Ok(())
}

/// Print the wallet ledger, newest first as the backend returns it.
///
/// # Errors
///
/// Returns an error if the ledger could not be fetched.
#[allow(clippy::print_stdout)]
pub async fn transactions(storefront: &Storefront) -> Result<(), StorefrontError> {
    for tx in storefront.wallet().transactions().await? {
        let date = tx
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:<16} {:<7} {:<8} {}",
            date,
            tx.kind.to_string(),
            tx.pm_type,
            storefront.display_price(tx.amount)
        );
    }
    Ok(())
}

/// Credit the wallet and print the new balance.
///
/// # Errors
///
/// Returns an error if the backend refuses the credit.
#[allow(clippy::print_stdout)]
pub async fn credit(
    storefront: &Storefront,
    amount: Decimal,
    method: PaymentMethod,
) -> Result<(), StorefrontError> {
    let credit = storefront.wallet().credit(Money::usd(amount), method.tag()).await?;
    println!(
        "credited {}, balance {}",
        storefront.display_price(credit.transaction.amount),
        storefront.display_price(credit.wallet.balance)
    );
    Ok(())
}
