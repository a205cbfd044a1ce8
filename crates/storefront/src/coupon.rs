//! Coupon resolution.
//!
//! Codes are validated by the backend only. At most one coupon is applied at a
//! time; applying another code replaces it.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, instrument};

use rahat_core::Money;

use crate::api::ApiError;
use crate::backend::StorefrontBackend;
use crate::error::ErrorCategory;
use crate::models::Coupon;
use crate::pricing::discount_for;
use crate::session::Session;
use crate::storage::lock;

/// Errors raised while applying a coupon.
#[derive(Debug, Error)]
pub enum CouponError {
    /// Nothing was entered; no request is made.
    #[error("Enter a coupon code")]
    EmptyCode,

    /// The backend does not accept the code.
    #[error("Invalid coupon code: {message}")]
    Invalid { code: String, message: String },

    #[error(transparent)]
    Api(ApiError),
}

impl CouponError {
    /// Where this error belongs in the UI's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyCode | Self::Invalid { .. } => ErrorCategory::Validation,
            Self::Api(e) => e.category(),
        }
    }
}

#[derive(Debug, Default)]
struct Applied {
    coupon: Option<Coupon>,
    code: String,
}

/// Holds the coupon applied to the current checkout.
pub struct CouponResolver {
    backend: Arc<dyn StorefrontBackend>,
    session: Arc<Session>,
    applied: Mutex<Applied>,
}

impl std::fmt::Debug for CouponResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponResolver")
            .field("applied", &*lock(&self.applied))
            .finish_non_exhaustive()
    }
}

impl CouponResolver {
    #[must_use]
    pub fn new(backend: Arc<dyn StorefrontBackend>, session: Arc<Session>) -> Self {
        Self {
            backend,
            session,
            applied: Mutex::default(),
        }
    }

    /// Validate `code` with the backend and apply it.
    ///
    /// A failed attempt leaves no coupon applied.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::EmptyCode` for blank input, `CouponError::Invalid`
    /// when the backend rejects the code, or `CouponError::Api` for any other
    /// failure.
    #[instrument(skip(self))]
    pub async fn apply(&self, code: &str) -> Result<Coupon, CouponError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        lock(&self.applied).code = code.to_string();

        match self.session.observed(self.backend.validate_coupon(code).await) {
            Ok(coupon) => {
                debug!(discount_type = ?coupon.discount_type, value = %coupon.value, "Coupon applied");
                lock(&self.applied).coupon = Some(coupon.clone());
                Ok(coupon)
            }
            Err(e) => {
                lock(&self.applied).coupon = None;
                Err(match e {
                    ApiError::Rejected { message, .. } => CouponError::Invalid {
                        code: code.to_string(),
                        message,
                    },
                    other => CouponError::Api(other),
                })
            }
        }
    }

    /// Drop the applied coupon and the entered code.
    pub fn remove(&self) {
        *lock(&self.applied) = Applied::default();
    }

    /// The applied coupon, if any.
    #[must_use]
    pub fn applied(&self) -> Option<Coupon> {
        lock(&self.applied).coupon.clone()
    }

    /// The code text last entered.
    #[must_use]
    pub fn code(&self) -> String {
        lock(&self.applied).code.clone()
    }

    /// Discount the applied coupon grants on `subtotal`; zero without one.
    #[must_use]
    pub fn discount(&self, subtotal: Money) -> Money {
        lock(&self.applied)
            .coupon
            .as_ref()
            .map_or(Money::ZERO, |c| discount_for(c, subtotal))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use rahat_core::DiscountType;

    use super::*;
    use crate::backend::MockStorefrontBackend;
    use crate::pricing::tests::coupon;
    use crate::session::tests::{signed_in, tokens_with, unauthorized, user};
    use crate::storage::TokenStore;

    fn resolver(backend: MockStorefrontBackend) -> CouponResolver {
        let backend: Arc<dyn StorefrontBackend> = Arc::new(backend);
        let session = Arc::new(Session::new(Arc::clone(&backend), TokenStore::in_memory()));
        CouponResolver::new(backend, session)
    }

    #[tokio::test]
    async fn test_apply_and_remove() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_validate_coupon()
            .withf(|code| code == "RAHAT10")
            .times(1)
            .returning(|_| {
                Ok(coupon(
                    "RAHAT10",
                    DiscountType::Percentage,
                    Decimal::new(10, 0),
                ))
            });

        let resolver = resolver(backend);
        resolver.apply("  RAHAT10 ").await.unwrap();
        assert_eq!(resolver.code(), "RAHAT10");
        assert_eq!(
            resolver.discount(Money::usd(Decimal::new(20, 0))),
            Money::usd(Decimal::new(2, 0))
        );

        resolver.remove();
        assert!(resolver.applied().is_none());
        assert_eq!(resolver.code(), "");
        assert_eq!(resolver.discount(Money::usd(Decimal::new(20, 0))), Money::ZERO);
    }

    #[tokio::test]
    async fn test_blank_code_makes_no_request() {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_validate_coupon().times(0);

        let resolver = resolver(backend);
        assert!(matches!(
            resolver.apply("   ").await,
            Err(CouponError::EmptyCode)
        ));
    }

    #[tokio::test]
    async fn test_rejected_code_clears_previous_coupon() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_validate_coupon()
            .withf(|code| code == "FIVE")
            .returning(|_| Ok(coupon("FIVE", DiscountType::Fixed, Decimal::new(5, 0))));
        backend
            .expect_validate_coupon()
            .withf(|code| code == "BOGUS")
            .returning(|_| {
                Err(ApiError::Rejected {
                    status: 404,
                    message: "Coupon not found".to_string(),
                    field_errors: BTreeMap::new(),
                })
            });

        let resolver = resolver(backend);
        resolver.apply("FIVE").await.unwrap();

        let err = resolver.apply("BOGUS").await.unwrap_err();
        assert!(matches!(err, CouponError::Invalid { ref code, .. } if code == "BOGUS"));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(resolver.applied().is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_validation_signs_out() {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_current_user().times(1).returning(|| Ok(user("7")));
        backend
            .expect_validate_coupon()
            .times(1)
            .returning(|_| Err(unauthorized()));

        let backend: Arc<dyn StorefrontBackend> = Arc::new(backend);
        let tokens = tokens_with("tok");
        let session = signed_in(&backend, tokens.clone()).await;
        let resolver = CouponResolver::new(backend, Arc::clone(&session));

        let err = resolver.apply("RAHAT10").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert!(!tokens.has_token());
        assert!(!session.is_authenticated());
        assert!(resolver.applied().is_none());
    }
}
