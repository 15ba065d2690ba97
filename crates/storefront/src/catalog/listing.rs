//! Catalog listing with wishlist flags.

use shopiverse_core::{Product, ProductId};

use super::CatalogStore;

/// Which products a listing shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductFilter {
    /// Every product.
    #[default]
    All,
    /// Products in the category with this slug (every product if the slug is unknown).
    Category(String),
    /// Only saved products.
    Wishlist,
}

/// A product as shown in a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard<'a> {
    pub product: &'a Product,
    pub in_wishlist: bool,
}

impl CatalogStore {
    /// List products matching `filter`, flagging each one that `is_saved` reports.
    ///
    /// Results keep catalog order. The wishlist view only contains catalog
    /// products, so saved IDs that no longer exist are skipped.
    pub fn listing<F>(&self, filter: &ProductFilter, is_saved: F) -> Vec<ProductCard<'_>>
    where
        F: Fn(&ProductId) -> bool,
    {
        let products: Vec<&Product> = match filter {
            ProductFilter::All => self.products().iter().collect(),
            ProductFilter::Category(slug) => self.products_by_category_slug(slug),
            ProductFilter::Wishlist => self.products().iter().filter(|p| is_saved(&p.id)).collect(),
        };

        products
            .into_iter()
            .map(|product| ProductCard {
                product,
                in_wishlist: is_saved(&product.id),
            })
            .collect()
    }
}
