//! Product detail view.

use shopiverse_core::{Category, Product, ProductId, ProductVariant};

use super::CatalogStore;

/// Everything the product page needs, resolved from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail<'a> {
    pub product: &'a Product,
    pub category: Option<&'a Category>,
    /// Preselected variant: the first one that is available.
    pub default_variant: Option<&'a ProductVariant>,
    pub in_wishlist: bool,
    /// Upper bound for the quantity selector.
    pub max_quantity: u32,
}

impl CatalogStore {
    /// Resolve the detail view for a product, or `None` if it is not in the catalog.
    #[must_use]
    pub fn detail(&self, id: &ProductId, in_wishlist: bool) -> Option<ProductDetail<'_>> {
        let product = self.product(id)?;
        Some(ProductDetail {
            product,
            category: self.category(&product.category_id),
            default_variant: product.first_available_variant(),
            in_wishlist,
            max_quantity: product.stock,
        })
    }
}

/// Keep a requested selector quantity within `1..=stock`.
///
/// Returns `None` when nothing can be ordered.
#[must_use]
pub fn clamp_quantity(requested: i64, stock: u32) -> Option<u32> {
    if stock == 0 {
        return None;
    }
    let clamped = requested.clamp(1, i64::from(stock));
    u32::try_from(clamped).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;

    #[test]
    fn test_detail_resolves_category_and_default_variant() {
        let catalog = catalog();
        let detail = catalog.detail(&ProductId::new("p1"), true);
        let detail = detail.as_ref();

        assert_eq!(
            detail.and_then(|d| d.category).map(|c| c.slug.as_str()),
            Some("headphones")
        );
        assert_eq!(
            detail.and_then(|d| d.default_variant).map(|v| v.id.as_str()),
            Some("v1")
        );
        assert_eq!(detail.map(|d| d.max_quantity), Some(15));
        assert_eq!(detail.map(|d| d.in_wishlist), Some(true));
    }

    #[test]
    fn test_detail_missing_product() {
        assert!(catalog().detail(&ProductId::new("p404"), false).is_none());
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(3, 8), Some(3));
        assert_eq!(clamp_quantity(0, 8), Some(1));
        assert_eq!(clamp_quantity(-4, 8), Some(1));
        assert_eq!(clamp_quantity(50, 8), Some(8));
        assert_eq!(clamp_quantity(1, 0), None);
    }
}
