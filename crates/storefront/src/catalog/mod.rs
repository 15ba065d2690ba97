//! Read-only product catalog.
//!
//! The catalog is loaded once at startup (from the bundled JSON or a file on
//! disk), validated, and never mutated afterwards. Queries are linear scans;
//! the catalog holds a few dozen records at most.
//!
//! # Catalog document
//!
//! ```json
//! {
//!   "categories": [{ "id": "c1", "name": "Headphones", "slug": "headphones" }],
//!   "products": [{ "id": "p1", "category": "c1", "price": 299.99, "...": "..." }]
//! }
//! ```

pub mod detail;
pub mod listing;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use shopiverse_core::{Category, CategoryId, Product, ProductId};

pub use detail::{ProductDetail, clamp_quantity};
pub use listing::{ProductCard, ProductFilter};

/// Catalog bundled with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Highest allowed product rating.
const MAX_RATING: f32 = 5.0;

/// On-disk catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Catalog store that holds every product and category in memory.
///
/// Cheap to clone; clones share the same records.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    categories: Arc<Vec<Category>>,
    products: Arc<Vec<Product>>,
}

impl CatalogStore {
    /// Load the catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document fails to parse or validate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog document from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        let store = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            products = store.products.len(),
            categories = store.categories.len(),
            "Loaded catalog"
        );
        Ok(store)
    }

    /// Parse a catalog document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the records are invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| CatalogError::Parse(format!("Failed to parse catalog: {e}")))?;
        Self::from_parts(doc.categories, doc.products)
    }

    /// Build a catalog from already-constructed records.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if IDs or slugs repeat, a product
    /// references an unknown category, or a price or rating is out of range.
    pub fn from_parts(
        categories: Vec<Category>,
        products: Vec<Product>,
    ) -> Result<Self, CatalogError> {
        validate(&categories, &products)?;
        Ok(Self {
            categories: Arc::new(categories),
            products: Arc::new(products),
        })
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All categories in catalog order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Get a product by ID
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Get a category by ID
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Get a category by its URL slug
    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Get products in a category
    pub fn products_by_category<'a>(
        &'a self,
        category_id: &'a CategoryId,
    ) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| &p.category_id == category_id)
    }

    /// Get products flagged as featured
    pub fn featured_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.featured)
    }

    /// Get products for a category slug.
    ///
    /// An unknown slug yields every product.
    #[must_use]
    pub fn products_by_category_slug(&self, slug: &str) -> Vec<&Product> {
        match self.category_by_slug(slug) {
            Some(category) => self.products_by_category(&category.id).collect(),
            None => {
                tracing::debug!(slug, "Unknown category slug, listing all products");
                self.products.iter().collect()
            }
        }
    }
}

fn validate(categories: &[Category], products: &[Product]) -> Result<(), CatalogError> {
    let mut category_ids = HashSet::new();
    let mut slugs = HashSet::new();
    for category in categories {
        if !category_ids.insert(&category.id) {
            return Err(CatalogError::Invalid(format!(
                "duplicate category id {}",
                category.id
            )));
        }
        if !slugs.insert(category.slug.as_str()) {
            return Err(CatalogError::Invalid(format!(
                "duplicate category slug {}",
                category.slug
            )));
        }
    }

    let mut product_ids = HashSet::new();
    for product in products {
        if !product_ids.insert(&product.id) {
            return Err(CatalogError::Invalid(format!(
                "duplicate product id {}",
                product.id
            )));
        }
        if !category_ids.contains(&product.category_id) {
            return Err(CatalogError::Invalid(format!(
                "product {} references unknown category {}",
                product.id, product.category_id
            )));
        }
        if product.price < Decimal::ZERO {
            return Err(CatalogError::Invalid(format!(
                "product {} has a negative price",
                product.id
            )));
        }
        if !(0.0..=MAX_RATING).contains(&product.rating) {
            return Err(CatalogError::Invalid(format!(
                "product {} rating {} is outside 0-{MAX_RATING}",
                product.id, product.rating
            )));
        }

        let mut variant_ids = HashSet::new();
        for variant in product.variants() {
            if !variant_ids.insert(&variant.id) {
                return Err(CatalogError::Invalid(format!(
                    "product {} has duplicate variant {}",
                    product.id, variant.id
                )));
            }
        }
    }

    Ok(())
}
