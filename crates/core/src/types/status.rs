//! Status and classification enums shared by backend records.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the customer pays for a checkout or top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Debit the customer's wallet balance.
    Wallet,
    /// Card payment through Stripe.
    Stripe,
}

impl PaymentMethod {
    /// The lower-cased `pm_type` tag the backend expects.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Stripe => "stripe",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown payment method.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wallet" => Ok(Self::Wallet),
            "stripe" | "card" => Ok(Self::Stripe),
            _ => Err(UnknownPaymentMethod(s.to_owned())),
        }
    }
}

/// Lifecycle of an order line on the backend.
///
/// Unrecognized values are preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    /// Translation key for the status label.
    #[must_use]
    pub const fn label_key(&self) -> Option<&'static str> {
        match self {
            Self::Pending => Some("status_pending"),
            Self::Completed => Some("status_completed"),
            Self::Failed => Some("status_failed"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// Direction of a wallet ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        })
    }
}

/// How a coupon's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountType {
    /// `value` is a percentage of the subtotal.
    Percentage,
    /// `value` is a flat USD amount.
    Fixed,
}

/// Legacy tenant account kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantKind {
    #[default]
    Personal,
    Business,
}
