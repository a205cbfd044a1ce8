//! Gateway to the storefront REST backend.
//!
//! Every backend call goes through [`ApiClient::request`], which:
//! - attaches `Authorization: Bearer <token>` when a token is persisted
//! - clears the persisted token on 401 (navigation is left to the caller)
//! - flags a missing backend rate limiter as a critical error
//! - retries storage-lock failures with linear backoff
//! - strips the optional `{ "data": ... }` envelope before decoding
//!
//! # Example
//!
//! ```rust,ignore
//! use rahat_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config, tokens)?;
//! let wallet: Wallet = api.get("/wallet").await?;
//! ```

mod envelope;
mod error;

pub use envelope::unwrap_envelope;
pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::StorefrontConfig;
use crate::storage::TokenStore;

use error::{ErrorBody, classify};

/// Linear backoff for transient storage-lock failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-issues after the first attempt.
    pub max_retries: u32,
    /// Delay before the first re-issue; the n-th waits `n * base_delay`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before re-issue number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Client for the storefront REST backend.
///
/// Cheap to clone; clones share the HTTP connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, tokens: TokenStore) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
                tokens,
                retry: RetryPolicy {
                    base_delay: config.retry_base_delay,
                    ..RetryPolicy::default()
                },
            }),
        })
    }

    /// The token store this client reads credentials from.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// The active retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// `GET endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, None).await
    }

    /// `POST endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, Some(body)).await
    }

    /// `POST endpoint` without a body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::POST, endpoint, None).await
    }

    /// `PUT endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    /// Issue a request and decode the unwrapped response body.
    ///
    /// Storage-lock failures are re-issued per the retry policy before being
    /// returned. Empty response bodies decode as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`] for transport failures, non-success
    /// responses, and bodies that do not decode as `T`.
    #[instrument(skip(self, body), fields(method = %method, endpoint = %endpoint))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let retry = self.inner.retry;
        let mut attempt = 0;

        let payload = loop {
            match self.send_once(&method, endpoint, body.as_ref()).await {
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    attempt += 1;
                    let delay = retry.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Backend storage locked, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => break other?,
            }
        };

        Ok(serde_json::from_value(payload)?)
    }

    /// One round trip: send, classify failures, unwrap the envelope.
    async fn send_once(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{endpoint}", self.inner.base_url);

        let mut request = self
            .inner
            .client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.inner.tokens.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = classify(status, ErrorBody::parse(&text));
            match &err {
                ApiError::Unauthorized { .. } => {
                    debug!("Clearing persisted token after 401");
                    self.inner.tokens.clear_token();
                }
                ApiError::BackendMisconfigured { message, .. } => {
                    tracing::error!(message = %message, "Backend rate limiter is not configured");
                    self.inner.tokens.flag_critical_error(message);
                }
                _ => {
                    tracing::error!(
                        status = %status,
                        body = %text.chars().take(500).collect::<String>(),
                        "Backend returned non-success status"
                    );
                }
            }
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            e
        })?;

        Ok(unwrap_envelope(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delays_are_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[test]
    fn test_client_uses_configured_backoff() -> Result<(), Box<dyn std::error::Error>> {
        let mut config = StorefrontConfig::new("http://127.0.0.1:9/api/")?;
        config.retry_base_delay = Duration::from_millis(5);
        let api = ApiClient::new(&config, TokenStore::in_memory())?;
        assert_eq!(api.retry_policy().base_delay, Duration::from_millis(5));
        assert_eq!(api.inner.base_url, "http://127.0.0.1:9/api");
        Ok(())
    }
}
