//! Mobile airtime top-up.
//!
//! Afghan mobile numbers identify their operator by the first three digits
//! (`07x`). The backend enforces a minimum amount of 10; the same check runs
//! here so an obviously invalid request is never sent.

use core::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use rahat_core::{Money, PaymentMethod};

use crate::api::ApiError;
use crate::backend::StorefrontBackend;
use crate::error::{ErrorCategory, add_breadcrumb};
use crate::models::{Coupon, TopUpReceipt, TopUpSubmission};
use crate::pricing::CheckoutSummary;
use crate::session::Session;
use crate::wallet::WalletService;

/// Smallest accepted top-up, in USD.
pub const MIN_TOP_UP: Money = Money::usd(Decimal::TEN);

/// Errors raised by [`TopUpService::submit`].
#[derive(Debug, Error)]
pub enum TopUpError {
    /// The request was refused locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Money, required: Money },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TopUpError {
    /// Where this error belongs in the UI's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::InsufficientBalance { .. } => ErrorCategory::Validation,
            Self::Api(e) => e.category(),
        }
    }
}

/// Mobile network operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Awcc,
    Roshan,
    Etisalat,
    Mtn,
    Salaam,
    AfghanTelecom,
}

impl Operator {
    /// Display name, as the backend records it.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Awcc => "AWCC",
            Self::Roshan => "Roshan",
            Self::Etisalat => "Etisalat",
            Self::Mtn => "MTN",
            Self::Salaam => "Salaam",
            Self::AfghanTelecom => "Afghan Telecom",
        }
    }

    /// Operator of `phone`, judged by its first three digits. Non-digits are
    /// ignored.
    #[must_use]
    pub fn detect(phone: &str) -> Option<Self> {
        let digits = normalize_phone(phone);
        match digits.get(..3)? {
            "070" | "071" => Some(Self::Awcc),
            "072" | "079" => Some(Self::Roshan),
            "073" | "078" => Some(Self::Etisalat),
            "076" | "077" => Some(Self::Mtn),
            "074" => Some(Self::Salaam),
            "075" => Some(Self::AfghanTelecom),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strip everything but ASCII digits.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// A top-up as entered by the customer.
#[derive(Debug, Clone, PartialEq)]
pub struct TopUpRequest {
    pub phone: String,
    /// Face value before any coupon.
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub coupon: Option<Coupon>,
}

impl TopUpRequest {
    #[must_use]
    pub fn new(phone: &str, amount: Money, payment_method: PaymentMethod) -> Self {
        Self {
            phone: normalize_phone(phone),
            amount,
            payment_method,
            coupon: None,
        }
    }

    /// Attach a resolved coupon.
    #[must_use]
    pub fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.coupon = Some(coupon);
        self
    }

    /// Detected operator of the phone number.
    #[must_use]
    pub fn operator(&self) -> Option<Operator> {
        Operator::detect(&self.phone)
    }

    /// The amount priced with the coupon; `total` is what the customer pays.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary::new(self.amount, self.coupon.as_ref())
    }

    /// Check the request before sending it.
    ///
    /// # Errors
    ///
    /// Returns `TopUpError::Validation` when the phone is missing or the amount
    /// is below [`MIN_TOP_UP`].
    pub fn validate(&self) -> Result<(), TopUpError> {
        if self.phone.is_empty() {
            return Err(TopUpError::Validation("Phone number is required.".to_string()));
        }
        if self.amount < MIN_TOP_UP {
            return Err(TopUpError::Validation(format!(
                "Minimum top-up amount is {}.",
                MIN_TOP_UP.amount()
            )));
        }
        Ok(())
    }

    fn submission(&self) -> TopUpSubmission {
        TopUpSubmission {
            phone: self.phone.clone(),
            amount: self.amount,
            operator: self.operator().map(|o| o.name().to_string()),
            pm_type: self.payment_method.tag(),
            coupon: self.coupon.as_ref().map(|c| c.code.clone()),
        }
    }
}

/// Submits top-ups and keeps the wallet cache honest.
pub struct TopUpService {
    backend: Arc<dyn StorefrontBackend>,
    wallet: Arc<WalletService>,
    session: Arc<Session>,
}

impl std::fmt::Debug for TopUpService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopUpService").finish_non_exhaustive()
    }
}

impl TopUpService {
    #[must_use]
    pub fn new(
        backend: Arc<dyn StorefrontBackend>,
        wallet: Arc<WalletService>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            backend,
            wallet,
            session,
        }
    }

    /// Validate and submit `request`.
    ///
    /// Wallet payments are checked against the post-coupon amount before the
    /// request is sent. The wallet cache is dropped after a successful top-up.
    ///
    /// # Errors
    ///
    /// Returns `TopUpError::Validation` or `TopUpError::InsufficientBalance`
    /// without contacting the top-up endpoint, or `TopUpError::Api` if the
    /// backend refuses the top-up.
    #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    pub async fn submit(&self, request: &TopUpRequest) -> Result<TopUpReceipt, TopUpError> {
        request.validate()?;

        if request.payment_method == PaymentMethod::Wallet {
            let required = request.summary().total;
            let balance = self.wallet.balance().await?;
            if balance < required {
                return Err(TopUpError::InsufficientBalance { balance, required });
            }
        }

        let submission = request.submission();
        let operator = submission.operator.clone().unwrap_or_default();
        let receipt = self
            .session
            .observed(self.backend.create_top_up(submission).await)?;
        self.wallet.invalidate();

        add_breadcrumb("topup", "Top-up submitted", Some(&[("operator", operator.as_str())]));
        info!(operator = %operator, amount = %request.amount, "Top-up submitted");
        Ok(receipt)
    }
}
