//! User, tenant, and profile types.

use serde::{Deserialize, Serialize};

use rahat_core::{Money, TenantId, TenantKind, UserId};

use super::{OrderProduct, Wallet, flexible_bool};

/// The authenticated customer as returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "phoneNumber", alias = "phone_number")]
    pub phone_number: Option<String>,
    #[serde(
        default,
        rename = "emailVerified",
        alias = "email_verified",
        deserialize_with = "flexible_bool"
    )]
    pub email_verified: bool,
    #[serde(
        default,
        rename = "isAdmin",
        alias = "is_admin",
        deserialize_with = "flexible_bool"
    )]
    pub is_admin: bool,
    /// Legacy sub-accounts, superseded by the wallet.
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub orders: Vec<OrderProduct>,
    #[serde(default)]
    pub wallet: Option<Wallet>,
}

impl User {
    /// Placeholder shown while nobody is signed in.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            id: UserId::new("guest"),
            name: "Guest User".to_string(),
            email: String::new(),
            phone_number: None,
            email_verified: false,
            is_admin: false,
            tenants: Vec::new(),
            orders: Vec::new(),
            wallet: None,
        }
    }

    /// Whether this is the [`User::guest`] placeholder.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.id.as_str() == "guest"
    }
}

/// A legacy tenant (sub-account) with its own balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TenantKind,
    /// Deprecated in favor of the wallet balance.
    #[serde(default)]
    pub balance: Money,
}

impl Tenant {
    /// Fallback used when a user has no tenants.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            id: TenantId::new("default"),
            name: "Default".to_string(),
            kind: TenantKind::Personal,
            balance: Money::ZERO,
        }
    }
}

/// Fields accepted by `PUT /user/profile`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}
