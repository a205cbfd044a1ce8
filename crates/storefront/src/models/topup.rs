//! Mobile top-up payloads.

use serde::{Deserialize, Serialize};

use rahat_core::Money;

/// Body of `POST /top-ups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopUpSubmission {
    /// Digits-only phone number.
    pub phone: String,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub pm_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

/// What the backend reports back for an accepted top-up.
///
/// The shape is loosely defined upstream, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TopUpReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
