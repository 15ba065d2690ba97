//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOPIVERSE_STORAGE_DIR` - Directory for cart and wishlist snapshots
//!   (default: in-memory, lost on exit)
//! - `SHOPIVERSE_CATALOG_PATH` - JSON catalog document (default: bundled catalog)
//! - `SHOPIVERSE_STOCK_POLICY` - `clamp` or `unchecked` (default: clamp)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;

use crate::cart::StockPolicy;

const STORAGE_DIR: &str = "SHOPIVERSE_STORAGE_DIR";
const CATALOG_PATH: &str = "SHOPIVERSE_CATALOG_PATH";
const STOCK_POLICY: &str = "SHOPIVERSE_STOCK_POLICY";
const SENTRY_DSN: &str = "SENTRY_DSN";
const SENTRY_ENVIRONMENT: &str = "SENTRY_ENVIRONMENT";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    /// Directory for persisted snapshots; `None` keeps them in memory
    pub storage_dir: Option<PathBuf>,
    /// Catalog document to load instead of the bundled one
    pub catalog_path: Option<PathBuf>,
    /// Whether cart quantities are capped at stock
    pub stock_policy: StockPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `SHOPIVERSE_STOCK_POLICY` is not
    /// a known policy.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let stock_policy = get_env_or_default(&lookup, STOCK_POLICY, "clamp")
            .parse::<StockPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar(STOCK_POLICY.to_string(), e))?;

        Ok(Self {
            storage_dir: get_optional_env(&lookup, STORAGE_DIR).map(PathBuf::from),
            catalog_path: get_optional_env(&lookup, CATALOG_PATH).map(PathBuf::from),
            stock_policy,
            sentry_dsn: get_optional_env(&lookup, SENTRY_DSN),
            sentry_environment: get_optional_env(&lookup, SENTRY_ENVIRONMENT),
        })
    }
}

/// Get an optional variable, treating an empty value as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}
