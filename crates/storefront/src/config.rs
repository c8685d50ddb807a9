//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_ORIGIN` - Backend origin (e.g., `https://larek-api.nomoreparties.co`).
//!   May be omitted when both `LAREK_API_URL` and `LAREK_CDN_URL` are set.
//!
//! ## Optional
//! - `LAREK_API_URL` - API base URL (default: `${API_ORIGIN}/api/weblarek`)
//! - `LAREK_CDN_URL` - Image CDN base URL (default: `${API_ORIGIN}/content/weblarek`)
//! - `LAREK_CACHE_TTL_SECS` - Catalog cache TTL in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const API_PATH: &str = "/api/weblarek";
const CDN_PATH: &str = "/content/weblarek";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct LarekConfig {
    /// API client configuration
    pub api: ApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub api_url: Url,
    /// Base URL product image paths are appended to
    pub cdn_url: Url,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
}

impl LarekConfig {
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

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        Ok(Self {
            api: ApiConfig::from_env(&env)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let origin = env.optional("API_ORIGIN");
        let api_url = env.url_or_origin("LAREK_API_URL", origin.as_deref(), API_PATH)?;
        let cdn_url = env.url_or_origin("LAREK_CDN_URL", origin.as_deref(), CDN_PATH)?;

        let cache_ttl = match env.optional("LAREK_CACHE_TTL_SECS") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("LAREK_CACHE_TTL_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            api_url,
            cdn_url,
            cache_ttl: Duration::from_secs(cache_ttl),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source. Blank values count as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Get a URL from `key`, or derive it from the API origin.
    fn url_or_origin(
        &self,
        key: &str,
        origin: Option<&str>,
        path: &str,
    ) -> Result<Url, ConfigError> {
        let (name, raw) = match (self.optional(key), origin) {
            (Some(value), _) => (key, value),
            (None, Some(origin)) => ("API_ORIGIN", format!("{}{path}", origin.trim_end_matches('/'))),
            (None, None) => return Err(ConfigError::MissingEnvVar("API_ORIGIN".to_string())),
        };

        Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
    }
}
