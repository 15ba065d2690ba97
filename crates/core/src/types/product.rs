//! Catalog records: products, their variants, and categories.
//!
//! The serde layout matches the JSON the storefront persists: camelCase field
//! names, numeric prices, RFC 3339 timestamps. A full [`Product`] is embedded
//! in every persisted cart line, so these shapes double as the storage format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, VariantId};
use super::price::{CurrencyCode, Price};

/// An immutable catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Base unit price, non-negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "currency")]
    pub currency_code: CurrencyCode,
    /// Image URL.
    pub image: String,
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    pub featured: bool,
    /// Average review score in `0.0..=5.0`.
    pub rating: f32,
    /// Units on hand; the upper bound for an orderable quantity.
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ProductVariant>>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Base price with this product's currency.
    #[must_use]
    pub const fn base_price(&self) -> Price {
        Price::new(self.price, self.currency_code)
    }

    /// Variants in display order (empty when the product has none).
    #[must_use]
    pub fn variants(&self) -> &[ProductVariant] {
        self.variants.as_deref().unwrap_or_default()
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants().iter().find(|v| &v.id == id)
    }

    /// The first variant that can currently be purchased.
    #[must_use]
    pub fn first_available_variant(&self) -> Option<&ProductVariant> {
        self.variants().iter().find(|v| v.available)
    }

    /// Unit price for this product, including a variant's adjustment if any.
    #[must_use]
    pub fn unit_price(&self, variant: Option<&ProductVariant>) -> Decimal {
        let adjustment = variant
            .and_then(|v| v.price_adjustment)
            .unwrap_or(Decimal::ZERO);
        self.price + adjustment
    }

    /// Whether any units are on hand.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A purchasable option of a product (e.g., a color).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Unique within the parent product.
    pub id: VariantId,
    pub name: String,
    /// Signed amount added to the product's base price.
    #[serde(
        rename = "price",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price_adjustment: Option<Decimal>,
    pub available: bool,
}

/// A catalog category used for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL slug, unique across categories.
    pub slug: String,
}
