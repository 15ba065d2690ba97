//! Unified error handling with Sentry integration.
//!
//! Each concern keeps its own error enum; `StorefrontError` wraps them for
//! the service-object commands in [`crate::state`].

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart command rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Product or variant not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StorefrontError {
    /// Whether the error was caused by the caller rather than the environment.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Cart(_) | Self::NotFound(_))
    }

    /// Log the error, sending environment failures to Sentry.
    pub fn report(&self) {
        if self.is_client_error() {
            tracing::debug!(error = %self, "Command rejected");
        } else {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item to cart", Some(&[("product_id", "p1")]));
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
    use shopiverse_core::ProductId;

    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::NotFound("product p99".to_string());
        assert_eq!(err.to_string(), "Not found: product p99");

        let err = StorefrontError::from(CartError::InvalidQuantity(0));
        assert_eq!(err.to_string(), "Cart error: Invalid quantity: 0");

        let err = StorefrontError::from(StorageError::InvalidKey("../cart".to_string()));
        assert!(err.to_string().starts_with("Storage error: "));
    }

    #[test]
    fn test_client_errors() {
        assert!(StorefrontError::NotFound("p1".to_string()).is_client_error());
        assert!(StorefrontError::from(CartError::OutOfStock(ProductId::new("p1"))).is_client_error());
        assert!(!StorefrontError::from(StorageError::LockPoisoned).is_client_error());
        let invalid = ConfigError::InvalidEnvVar("SHOPIVERSE_STOCK_POLICY".to_string(), "x".to_string());
        assert!(!StorefrontError::from(invalid).is_client_error());
    }

    #[test]
    fn test_breadcrumb_without_client() {
        // No Sentry client is bound in tests; this must be a no-op.
        add_breadcrumb("cart", "Cleared cart", Some(&[("lines", "2")]));
        StorefrontError::NotFound("p1".to_string()).report();
    }
}
