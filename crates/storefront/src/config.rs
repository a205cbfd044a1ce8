//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `RAHAT_API_BASE_URL` - Backend REST API root (default: `https://dashboard.rahatpay.com/api`)
//! - `RAHAT_STORAGE_BASE_URL` - Public media root (default: `https://dashboard.rahatpay.com/storage`)
//! - `RAHAT_STATE_FILE` - File holding the persisted token and critical-error flag.
//!   When unset, client state lives in memory only.
//! - `RAHAT_CATALOG_TTL_SECS` - Catalog cache time-to-live (default: 300)
//! - `RAHAT_RETRY_BASE_DELAY_MS` - Base delay of the storage-lock retry backoff (default: 1000)
//! - `RAHAT_HTTP_TIMEOUT_SECS` - Per-request timeout. Unset means no client-side timeout.
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://dashboard.rahatpay.com/api";
const DEFAULT_STORAGE_BASE_URL: &str = "https://dashboard.rahatpay.com/storage";
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API root, without a trailing slash
    pub api_base_url: Url,
    /// Root that relative media paths are resolved against
    pub storage_base_url: Url,
    /// Where the token and critical-error flag are persisted
    pub state_file: Option<PathBuf>,
    /// How long catalog responses stay cached
    pub catalog_ttl: Duration,
    /// Base delay of the linear storage-lock backoff
    pub retry_base_delay: Duration,
    /// Optional per-request timeout
    pub http_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Build a configuration for `api_base_url` with every other setting at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not an absolute URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_url("RAHAT_API_BASE_URL", api_base_url)?,
            storage_base_url: parse_url("RAHAT_STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL)?,
            state_file: None,
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            http_timeout: None,
            sentry_dsn: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_url(
            "RAHAT_API_BASE_URL",
            &get_env_or_default("RAHAT_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let storage_base_url = parse_url(
            "RAHAT_STORAGE_BASE_URL",
            &get_env_or_default("RAHAT_STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL),
        )?;
        let state_file = get_optional_env("RAHAT_STATE_FILE").map(PathBuf::from);
        let catalog_ttl = Duration::from_secs(get_u64_or_default(
            "RAHAT_CATALOG_TTL_SECS",
            DEFAULT_CATALOG_TTL_SECS,
        )?);
        let retry_base_delay = Duration::from_millis(get_u64_or_default(
            "RAHAT_RETRY_BASE_DELAY_MS",
            DEFAULT_RETRY_BASE_DELAY_MS,
        )?);
        let http_timeout = get_optional_env("RAHAT_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_u64("RAHAT_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_base_url,
            storage_base_url,
            state_file,
            catalog_ttl,
            retry_base_delay,
            http_timeout,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| parse_u64(key, &raw))
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an absolute http(s) URL and strip any trailing slash from its path.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = StorefrontConfig::new("http://127.0.0.1:8000/api/").unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:8000/api");
        assert_eq!(
            config.storage_base_url.as_str(),
            "https://dashboard.rahatpay.com/storage"
        );
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert!(config.http_timeout.is_none());
        assert!(config.state_file.is_none());
    }

    #[test]
    fn test_parse_url_rejects_relative() {
        let err = StorefrontConfig::new("/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "RAHAT_API_BASE_URL"));
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(parse_url("X", "ftp://example.com").is_err());
    }

    #[test]
    fn test_parse_u64_reports_key() {
        let err = parse_u64("RAHAT_CATALOG_TTL_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("RAHAT_CATALOG_TTL_SECS"));
    }
}
