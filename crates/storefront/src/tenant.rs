//! Legacy tenant selection.
//!
//! Tenants predate the wallet. Their balance field is still sent by the
//! backend but the wallet balance, when loaded, takes precedence.

use thiserror::Error;

use rahat_core::TenantId;

use crate::models::{Tenant, User, Wallet};

/// Returned when switching to a tenant the user does not own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tenant: {0}")]
pub struct UnknownTenant(pub TenantId);

/// Which of the user's tenants is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantSelection {
    selected: Option<TenantId>,
}

impl TenantSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicitly selected tenant id, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&TenantId> {
        self.selected.as_ref()
    }

    /// Make `tenant_id` the active tenant.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTenant` if `user` has no tenant with that id.
    pub fn switch(&mut self, user: &User, tenant_id: TenantId) -> Result<(), UnknownTenant> {
        if !user.tenants.iter().any(|t| t.id == tenant_id) {
            return Err(UnknownTenant(tenant_id));
        }
        self.selected = Some(tenant_id);
        Ok(())
    }

    /// Forget the selection, e.g. on logout.
    pub fn reset(&mut self) {
        self.selected = None;
    }

    /// The active tenant: the selected one, else the user's first, else a
    /// zero-balance `Default` tenant. A loaded wallet's balance replaces the
    /// tenant's own.
    #[must_use]
    pub fn current_tenant(&self, user: &User, wallet: Option<&Wallet>) -> Tenant {
        let mut tenant = self
            .selected
            .as_ref()
            .and_then(|id| user.tenants.iter().find(|t| &t.id == id))
            .or_else(|| user.tenants.first())
            .cloned()
            .unwrap_or_else(Tenant::fallback);

        if let Some(wallet) = wallet {
            tenant.balance = wallet.balance;
        }
        tenant
    }
}
