//! Wallet and ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rahat_core::{Money, TransactionId, TransactionKind, WalletId};

use super::{flexible_bool, lenient_timestamp};

/// A user's wallet. The balance is a cached copy of the server's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub balance: Money,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: TransactionId,
    pub pm_type: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(default)]
    pub wallet_id: Option<WalletId>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response of `POST /wallet/credit` and `POST /wallet/debit`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletCredit {
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
}

/// Body of `POST /wallet/credit` and `POST /wallet/debit`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct WalletMovement<'a> {
    pub amount: Money,
    pub pm_type: &'a str,
}
