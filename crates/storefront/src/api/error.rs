//! Gateway errors and their classification.
//!
//! The backend does not send machine-readable error codes, so two conditions
//! are recognized by substring match on the error message. That matching is
//! confined to [`classify`]; if the backend grows structured codes, only that
//! function changes.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Message fragment of a transient SQLite lock on the backend.
const STORAGE_LOCKED_MARKER: &str = "database is locked";

/// Message fragment of a missing rate-limiter definition on the backend.
const RATE_LIMITER_MARKER: &str = "rate limiter";

/// Errors returned by [`ApiClient`](super::ApiClient) requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401: the token is missing, expired, or revoked. The persisted token
    /// has already been cleared when this is returned.
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other 4xx: the request was understood and refused (invalid coupon,
    /// insufficient funds, failed validation).
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        /// Per-field validation messages, keyed by form field.
        field_errors: BTreeMap<String, Vec<String>>,
    },

    /// The backend database was locked on every attempt.
    #[error("{message}")]
    StorageLocked { status: u16, message: String },

    /// The backend has no rate limiter configured. Fatal for the session;
    /// the critical-error flag has been persisted.
    #[error("{message}")]
    BackendMisconfigured { status: u16, message: String },

    /// Any other non-success response.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::Rejected { status, .. }
            | Self::StorageLocked { status, .. }
            | Self::BackendMisconfigured { status, .. }
            | Self::Server { status, .. } => Some(*status),
            Self::Parse(_) => None,
        }
    }

    /// Whether the request may succeed if re-issued unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageLocked { .. })
    }

    /// Whether this error means the session is no longer authenticated.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Where this error belongs in the UI's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::Rejected { .. } => ErrorCategory::Validation,
            Self::StorageLocked { .. } => ErrorCategory::Transient,
            Self::BackendMisconfigured { .. } => ErrorCategory::Misconfiguration,
            Self::Http(e) if e.is_timeout() || e.is_connect() => ErrorCategory::Transient,
            Self::Http(_) | Self::Server { .. } | Self::Parse(_) => ErrorCategory::Internal,
        }
    }

    /// The first validation message for `field`, if the backend sent one.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Rejected { field_errors, .. } => field_errors
                .get(field)
                .and_then(|messages| messages.first())
                .map(String::as_str),
            _ => None,
        }
    }
}

/// Error body as sent by the backend.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ErrorBody {
    /// Parse an error body, tolerating empty or non-JSON payloads.
    pub(crate) fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

/// Map a non-success response onto an [`ApiError`].
pub(crate) fn classify(status: StatusCode, body: ErrorBody) -> ApiError {
    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Server Error: {}", status.as_u16()));
    let lowered = message.to_lowercase();
    let code = status.as_u16();

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized { message }
    } else if lowered.contains(STORAGE_LOCKED_MARKER) {
        ApiError::StorageLocked {
            status: code,
            message,
        }
    } else if lowered.contains(RATE_LIMITER_MARKER) {
        ApiError::BackendMisconfigured {
            status: code,
            message,
        }
    } else if status.is_client_error() {
        ApiError::Rejected {
            status: code,
            message,
            field_errors: body.errors,
        }
    } else {
        ApiError::Server {
            status: code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_raw(status: u16, raw: &str) -> ApiError {
        classify(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorBody::parse(raw),
        )
    }

    #[test]
    fn test_unauthorized() {
        let err = classify_raw(401, r#"{"message": "Unauthenticated."}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Unauthenticated.");
    }

    #[test]
    fn test_fallback_message() {
        let err = classify_raw(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
        assert_eq!(err.to_string(), "Server Error: 502");
    }

    #[test]
    fn test_storage_locked_is_retryable() {
        let err = classify_raw(
            500,
            r#"{"message": "SQLSTATE[HY000]: General error: 5 database is locked"}"#,
        );
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_missing_rate_limiter() {
        let err = classify_raw(500, r#"{"message": "Rate limiter [api] is not defined."}"#);
        assert!(matches!(err, ApiError::BackendMisconfigured { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_keeps_field_errors() {
        let err = classify_raw(
            422,
            r#"{"message": "The code is invalid.", "errors": {"code": ["The code is invalid."]}}"#,
        );
        match err {
            ApiError::Rejected {
                status,
                field_errors,
                ..
            } => {
                assert_eq!(status, 422);
                assert_eq!(field_errors.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_field_error_lookup() {
        let err = classify_raw(
            422,
            r#"{"message": "Invalid.", "errors": {"email": ["The email has already been taken."]}}"#,
        );
        assert_eq!(err.field_error("email"), Some("The email has already been taken."));
        assert_eq!(err.field_error("name"), None);
    }

    #[test]
    fn test_blank_message_uses_fallback() {
        let err = classify_raw(404, r#"{"message": "  "}"#);
        assert_eq!(err.to_string(), "Server Error: 404");
        assert!(matches!(err, ApiError::Rejected { status: 404, .. }));
    }
}
