//! Unified error handling with Sentry integration.
//!
//! Every module has its own error enum; [`StorefrontError`] wraps them all so
//! a front end can hold one error type. [`StorefrontError::category`] maps any
//! failure onto the handful of ways a UI reacts to it (inline message,
//! sign-in prompt, blocking page).

use thiserror::Error;

use rahat_core::EmailError;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::coupon::CouponError;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::tenant::UnknownTenant;
use crate::topup::TopUpError;

/// How a failure should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The session is gone; demote to guest and ask for a sign-in.
    Authentication,
    /// The request was refused; show the message next to the form control.
    Validation,
    /// A retryable backend condition outlasted the retry budget.
    Transient,
    /// The backend is misconfigured; block the UI until dismissed.
    Misconfiguration,
    /// Checkout stopped after creating some orders.
    PartialCheckout,
    /// Anything else.
    Internal,
}

/// Any error raised by the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    TopUp(#[from] TopUpError),

    #[error(transparent)]
    Tenant(#[from] UnknownTenant),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Email(#[from] EmailError),
}

impl StorefrontError {
    /// Where this error belongs in the UI's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(e) => e.category(),
            Self::Session(e) => e.category(),
            Self::Coupon(e) => e.category(),
            Self::Checkout(e) => e.category(),
            Self::TopUp(e) => e.category(),
            Self::Email(_) | Self::Tenant(_) => ErrorCategory::Validation,
            Self::Config(_) | Self::Storage(_) => ErrorCategory::Internal,
        }
    }

    /// Capture to Sentry if the error is not something the user caused.
    ///
    /// Validation and authentication failures are expected traffic and only
    /// logged at debug level.
    pub fn report(&self) {
        match self.category() {
            ErrorCategory::Internal
            | ErrorCategory::Misconfiguration
            | ErrorCategory::PartialCheckout => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Storefront error"
                );
            }
            ErrorCategory::Transient => tracing::warn!(error = %self, "Transient storefront error"),
            ErrorCategory::Authentication | ErrorCategory::Validation => {
                tracing::debug!(error = %self, "Storefront request refused");
            }
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.filter(|e| !e.is_empty()).map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Order line created", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_api_error_categories() {
        let cases = [
            (
                ApiError::Unauthorized {
                    message: "Unauthenticated.".to_string(),
                },
                ErrorCategory::Authentication,
            ),
            (
                ApiError::Rejected {
                    status: 422,
                    message: "Invalid coupon".to_string(),
                    field_errors: BTreeMap::new(),
                },
                ErrorCategory::Validation,
            ),
            (
                ApiError::StorageLocked {
                    status: 500,
                    message: "database is locked".to_string(),
                },
                ErrorCategory::Transient,
            ),
            (
                ApiError::BackendMisconfigured {
                    status: 500,
                    message: "Rate limiter [api] is not defined.".to_string(),
                },
                ErrorCategory::Misconfiguration,
            ),
            (
                ApiError::Server {
                    status: 500,
                    message: "Server Error: 500".to_string(),
                },
                ErrorCategory::Internal,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(StorefrontError::from(err).category(), expected);
        }
    }

    #[test]
    fn test_local_error_categories() {
        assert_eq!(
            StorefrontError::from(EmailError::Empty).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorefrontError::from(CheckoutError::EmptyCart).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorefrontError::from(ConfigError::InvalidEnvVar(
                "RAHAT_API_BASE_URL".to_string(),
                "relative URL".to_string()
            ))
            .category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_display_is_transparent() {
        let err = StorefrontError::from(ApiError::Server {
            status: 503,
            message: "Server Error: 503".to_string(),
        });
        assert_eq!(err.to_string(), "Server Error: 503");
    }
}
