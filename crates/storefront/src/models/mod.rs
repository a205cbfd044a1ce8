//! Backend record types.
//!
//! These mirror the JSON the backend returns after envelope unwrapping. The
//! backend mixes camelCase and snake_case field names between endpoints, so
//! fields that have been seen both ways carry a serde alias.

pub mod auth;
pub mod catalog;
pub mod content;
pub mod order;
pub mod topup;
pub mod user;
pub mod wallet;

pub use auth::{AuthResponse, LoginCredentials, RegisterData};
pub use catalog::{Coupon, Product, ProductCategory};
pub use content::{BlogPost, Page};
pub use order::{NewOrderProduct, OrderProduct};
pub use topup::{TopUpReceipt, TopUpSubmission};
pub use user::{ProfileUpdate, Tenant, User};
pub use wallet::{Wallet, WalletCredit, WalletTransaction};
pub(crate) use wallet::WalletMovement;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Deserialize an optional timestamp, treating unparseable values as absent.
///
/// Listings should not fail because one record carries a timestamp in a
/// format other than RFC 3339.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .map(|naive| naive.and_utc())
            })
            .ok()
    }))
}

/// Deserialize a boolean the backend may send as `0`/`1` or `true`/`false`.
pub(crate) fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(n) => n != 0,
        Raw::Null(()) => false,
    })
}
