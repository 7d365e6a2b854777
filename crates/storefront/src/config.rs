//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_URL` - Base URL of the backend REST service
//!
//! ## Optional
//! - `BAZAAR_CART_PATH` - Cart persistence file (default: .bazaar/cart.json)
//! - `BAZAAR_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BAZAAR_CATALOG_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CART_PATH: &str = ".bazaar/cart.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";
const DEFAULT_CATALOG_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Where the cart is persisted between runs
    pub cart_path: PathBuf,
    /// How long catalog listings stay cached
    pub catalog_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Backend API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative endpoint paths join under it
    pub base_url: Url,
    /// Upper bound on any single request
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Build API settings for `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("BAZAAR_API_URL", base_url)?,
            request_timeout: Duration::from_secs(30),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let base_url = parse_base_url("BAZAAR_API_URL", &env.required("BAZAAR_API_URL")?)?;
        let request_timeout = Duration::from_secs(env.parsed_or(
            "BAZAAR_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let catalog_ttl =
            Duration::from_secs(env.parsed_or("BAZAAR_CATALOG_TTL_SECS", DEFAULT_CATALOG_TTL_SECS)?);

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout,
            },
            cart_path: PathBuf::from(env.or_default("BAZAAR_CART_PATH", DEFAULT_CART_PATH)),
            catalog_ttl,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable parsed as `u64`, with a default value.
    fn parsed_or(&self, key: &str, default: &str) -> Result<u64, ConfigError> {
        self.or_default(key, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse and normalize the backend base URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BAZAAR_API_URL", "http://localhost:5000")]).unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert_eq!(config.cart_path, PathBuf::from(".bazaar/cart.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "BAZAAR_API_URL"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = load(&[("BAZAAR_API_URL", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = load(&[("BAZAAR_API_URL", "https://shop.example.com/backend")]).unwrap();
        assert_eq!(
            config.api.base_url.join("api/products").unwrap().as_str(),
            "https://shop.example.com/backend/api/products"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = load(&[("BAZAAR_API_URL", "ftp://example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000"),
            ("BAZAAR_REQUEST_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BAZAAR_REQUEST_TIMEOUT_SECS")
        );

        let err = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000"),
            ("BAZAAR_REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000/"),
            ("BAZAAR_CART_PATH", "/tmp/cart.json"),
            ("BAZAAR_REQUEST_TIMEOUT_SECS", "5"),
            ("BAZAAR_CATALOG_TTL_SECS", "0"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();

        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert_eq!(config.catalog_ttl, Duration::ZERO);
        assert_eq!(config.cart_path, PathBuf::from("/tmp/cart.json"));
        assert!(config.sentry_dsn.is_some());
    }
}
