//! Wallet balance and ledger.
//!
//! The balance held here is a cache of the server's value. Mutations never
//! adjust it locally; they invalidate it so the next read refetches.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument};

use rahat_core::Money;

use crate::api::ApiError;
use crate::backend::StorefrontBackend;
use crate::error::add_breadcrumb;
use crate::models::{Wallet, WalletCredit, WalletTransaction};
use crate::session::Session;
use crate::storage::lock;

/// Wallet operations fail only with gateway errors.
pub type WalletError = ApiError;

#[derive(Debug, Default)]
struct WalletCache {
    wallet: Option<Wallet>,
    transactions: Option<Vec<WalletTransaction>>,
}

/// Cached access to the signed-in user's wallet.
///
/// Every backend error is shown to the session, so a 401 here signs the user
/// out.
pub struct WalletService {
    backend: Arc<dyn StorefrontBackend>,
    session: Arc<Session>,
    cache: Mutex<WalletCache>,
}

impl std::fmt::Debug for WalletService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletService")
            .field("cache", &*lock(&self.cache))
            .finish_non_exhaustive()
    }
}

impl WalletService {
    #[must_use]
    pub fn new(backend: Arc<dyn StorefrontBackend>, session: Arc<Session>) -> Self {
        Self {
            backend,
            session,
            cache: Mutex::default(),
        }
    }

    /// The wallet, fetched on first use after an invalidation.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the fetch fails.
    #[instrument(skip(self))]
    pub async fn wallet(&self) -> Result<Wallet, WalletError> {
        if let Some(wallet) = lock(&self.cache).wallet.clone() {
            debug!("Cache hit for wallet");
            return Ok(wallet);
        }

        let wallet = self.session.observed(self.backend.wallet().await)?;
        lock(&self.cache).wallet = Some(wallet.clone());
        Ok(wallet)
    }

    /// Current balance in USD.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the wallet fetch fails.
    pub async fn balance(&self) -> Result<Money, WalletError> {
        Ok(self.wallet().await?.balance)
    }

    /// The cached wallet without fetching.
    #[must_use]
    pub fn cached(&self) -> Option<Wallet> {
        lock(&self.cache).wallet.clone()
    }

    /// Ledger entries, fetched on first use after an invalidation.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the fetch fails.
    #[instrument(skip(self))]
    pub async fn transactions(&self) -> Result<Vec<WalletTransaction>, WalletError> {
        if let Some(transactions) = lock(&self.cache).transactions.clone() {
            debug!("Cache hit for wallet transactions");
            return Ok(transactions);
        }

        let transactions = self
            .session
            .observed(self.backend.wallet_transactions().await)?;
        lock(&self.cache).transactions = Some(transactions.clone());
        Ok(transactions)
    }

    /// Add funds. The cached balance and ledger are dropped on success.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the backend refuses the credit.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn credit(&self, amount: Money, pm_type: &str) -> Result<WalletCredit, WalletError> {
        let credit = self
            .session
            .observed(self.backend.credit_wallet(amount, pm_type).await)?;
        self.invalidate();
        add_breadcrumb("wallet", "Wallet credited", Some(&[("pm_type", pm_type)]));
        info!(transaction_id = %credit.transaction.id, "Wallet credited");
        Ok(credit)
    }

    /// Withdraw funds. The cached balance and ledger are dropped on success.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the backend refuses the debit.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn debit(&self, amount: Money, pm_type: &str) -> Result<WalletCredit, WalletError> {
        let debit = self
            .session
            .observed(self.backend.debit_wallet(amount, pm_type).await)?;
        self.invalidate();
        info!(transaction_id = %debit.transaction.id, "Wallet debited");
        Ok(debit)
    }

    /// Drop the cached balance and ledger.
    pub fn invalidate(&self) {
        *lock(&self.cache) = WalletCache::default();
    }
}
