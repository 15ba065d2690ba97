//! Storefront state shared by the presentation layer.
//!
//! [`StorefrontState`] is built once at startup and owns the catalog and both
//! engines. Views hold a reference to it instead of reaching for globals.

use std::rc::Rc;
use std::sync::Arc;

use shopiverse_core::{ProductId, VariantId};

use crate::cart::{CartEngine, StockPolicy};
use crate::catalog::{CatalogStore, ProductCard, ProductDetail, ProductFilter};
use crate::config::{ConfigError, StorefrontConfig};
use crate::error::{Result, StorefrontError};
use crate::events::{StorefrontEvent, SubscriptionId};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::wishlist::WishlistEngine;

/// Subscription handles returned by [`StorefrontState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSubscription {
    cart: SubscriptionId,
    wishlist: SubscriptionId,
}

/// Catalog, cart and wishlist behind one handle.
#[derive(Debug)]
pub struct StorefrontState {
    catalog: CatalogStore,
    cart: CartEngine,
    wishlist: WishlistEngine,
}

impl StorefrontState {
    /// Create the state described by `config`.
    ///
    /// Opens a [`FileStore`] when a storage directory is configured (otherwise
    /// a [`MemoryStore`]), loads the configured or bundled catalog, and
    /// rehydrates both engines.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created or the
    /// catalog cannot be loaded.
    pub fn new(config: &StorefrontConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStore::open(dir.clone())?),
            None => {
                tracing::warn!("No storage directory configured, cart and wishlist are not persisted");
                Arc::new(MemoryStore::new())
            }
        };

        let catalog = match &config.catalog_path {
            Some(path) => CatalogStore::load(path)?,
            None => CatalogStore::builtin()?,
        };

        Ok(Self::from_parts(catalog, store, config.stock_policy))
    }

    /// Create the state from `SHOPIVERSE_*` environment variables, loading
    /// `.env` first.
    ///
    /// Failures are reported before being returned.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Config` for invalid variables, or any error
    /// from [`StorefrontState::new`].
    pub fn from_env() -> Result<Self> {
        Self::from_config(StorefrontConfig::from_env())
    }

    /// Like [`StorefrontState::from_env`], reading variables from `lookup`.
    ///
    /// # Errors
    ///
    /// See [`StorefrontState::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::from_config(StorefrontConfig::from_lookup(lookup))
    }

    fn from_config(config: std::result::Result<StorefrontConfig, ConfigError>) -> Result<Self> {
        config
            .map_err(StorefrontError::from)
            .and_then(|config| Self::new(&config))
            .inspect_err(StorefrontError::report)
    }

    /// Create the state from already-built parts.
    ///
    /// Both engines share `store`.
    #[must_use]
    pub fn from_parts(
        catalog: CatalogStore,
        store: Arc<dyn KeyValueStore>,
        stock_policy: StockPolicy,
    ) -> Self {
        let cart = CartEngine::restore(Arc::clone(&store), stock_policy);
        let wishlist = WishlistEngine::restore(store, catalog.clone());
        Self {
            catalog,
            cart,
            wishlist,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartEngine {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartEngine {
        &mut self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistEngine {
        &self.wishlist
    }

    pub const fn wishlist_mut(&mut self) -> &mut WishlistEngine {
        &mut self.wishlist
    }

    /// Add a catalog product (and optionally one of its variants) to the cart.
    ///
    /// Returns the line's resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product or variant is not in
    /// the catalog, or `StorefrontError::Cart` if the cart rejects the add.
    pub fn add_to_cart(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        variant_id: Option<&VariantId>,
    ) -> Result<u32> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("product {product_id}")))?;

        let variant = match variant_id {
            Some(id) => Some(product.variant(id).ok_or_else(|| {
                StorefrontError::NotFound(format!("variant {id} of product {product_id}"))
            })?),
            None => None,
        };

        self.cart
            .add_item(product, quantity, variant)
            .map_err(StorefrontError::from)
    }

    /// Save or unsave a catalog product. Returns whether the wishlist changed.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` when saving a product that is not in
    /// the catalog. Unsaving is always allowed so stale IDs can be removed.
    pub fn toggle_wishlist(&mut self, product_id: &ProductId, saved: bool) -> Result<bool> {
        if saved && self.catalog.product(product_id).is_none() {
            return Err(StorefrontError::NotFound(format!("product {product_id}")));
        }
        Ok(self.wishlist.toggle(product_id, saved))
    }

    /// Product cards for a listing page.
    #[must_use]
    pub fn listing(&self, filter: &ProductFilter) -> Vec<ProductCard<'_>> {
        self.catalog.listing(filter, |id| self.wishlist.contains(id))
    }

    /// Detail view for a product page.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product is not in the catalog.
    pub fn product_detail(&self, product_id: &ProductId) -> Result<ProductDetail<'_>> {
        self.catalog
            .detail(product_id, self.wishlist.contains(product_id))
            .ok_or_else(|| StorefrontError::NotFound(format!("product {product_id}")))
    }

    /// Register one callback for both cart and wishlist events.
    pub fn subscribe(&mut self, callback: impl Fn(&StorefrontEvent) + 'static) -> StateSubscription {
        let callback = Rc::new(callback);
        let for_wishlist = Rc::clone(&callback);
        StateSubscription {
            cart: self.cart.subscribe(move |event| callback(event)),
            wishlist: self.wishlist.subscribe(move |event| for_wishlist(event)),
        }
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, subscription: StateSubscription) -> bool {
        let cart = self.cart.unsubscribe(subscription.cart);
        let wishlist = self.wishlist.unsubscribe(subscription.wishlist);
        cart && wishlist
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::catalog::tests::catalog;
    use crate::events::Notice;

    fn state() -> StorefrontState {
        StorefrontState::from_parts(catalog(), Arc::new(MemoryStore::new()), StockPolicy::Clamp)
    }

    #[test]
    fn test_add_to_cart_resolves_variant() {
        let mut state = state();
        let qty = state
            .add_to_cart(&ProductId::new("p1"), 2, Some(&VariantId::new("v2")))
            .unwrap();
        assert_eq!(qty, 2);

        let line = state.cart().items().first().unwrap();
        assert_eq!(line.variant().map(|v| v.name.as_str()), Some("White"));
    }

    #[test]
    fn test_add_to_cart_not_found() {
        let mut state = state();
        assert!(matches!(
            state.add_to_cart(&ProductId::new("p99"), 1, None),
            Err(StorefrontError::NotFound(_))
        ));
        assert!(matches!(
            state.add_to_cart(&ProductId::new("p1"), 1, Some(&VariantId::new("v9"))),
            Err(StorefrontError::NotFound(msg)) if msg.contains("variant v9")
        ));
        assert!(state.cart().is_empty());
    }

    #[test]
    fn test_add_to_cart_propagates_cart_error() {
        let mut state = state();
        assert!(matches!(
            state.add_to_cart(&ProductId::new("p1"), 0, None),
            Err(StorefrontError::Cart(_))
        ));
    }

    #[test]
    fn test_wishlist_flags_flow_into_views() {
        let mut state = state();
        assert!(state.toggle_wishlist(&ProductId::new("p3"), true).unwrap());

        let saved = state.listing(&ProductFilter::Wishlist);
        assert_eq!(saved.len(), 1);
        assert!(saved.iter().all(|card| card.in_wishlist));

        let detail = state.product_detail(&ProductId::new("p3")).unwrap();
        assert!(detail.in_wishlist);
    }

    #[test]
    fn test_toggle_wishlist_unknown_product() {
        let mut state = state();
        assert!(state.toggle_wishlist(&ProductId::new("p99"), true).is_err());
        assert!(!state.toggle_wishlist(&ProductId::new("p99"), false).unwrap());
    }

    #[test]
    fn test_product_detail_not_found() {
        assert!(matches!(
            state().product_detail(&ProductId::new("p0")),
            Err(StorefrontError::NotFound(_))
        ));
    }

    #[test]
    fn test_subscribe_receives_both_engines() {
        let mut state = state();
        let notices = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notices);
        let subscription = state.subscribe(move |event| {
            if let StorefrontEvent::Notice(notice) = event {
                sink.borrow_mut().push(notice.clone());
            }
        });

        state.add_to_cart(&ProductId::new("p4"), 1, None).unwrap();
        state.toggle_wishlist(&ProductId::new("p4"), true).unwrap();
        assert_eq!(notices.borrow().len(), 2);
        assert_eq!(
            notices.borrow().last(),
            Some(&Notice::AddedToWishlist {
                product_name: "Wireless Charging Pad".to_string()
            })
        );

        assert!(state.unsubscribe(subscription));
        state.cart_mut().clear();
        assert_eq!(notices.borrow().len(), 2);
    }

    #[test]
    fn test_new_from_config_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..StorefrontConfig::default()
        };

        let mut state = StorefrontState::new(&config).unwrap();
        state.add_to_cart(&ProductId::new("p6"), 3, None).unwrap();
        drop(state);

        let state = StorefrontState::new(&config).unwrap();
        assert_eq!(state.cart().total_items(), 3);
    }

    #[test]
    fn test_from_lookup_reads_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().to_string_lossy().into_owned();
        let lookup = |key: &str| (key == "SHOPIVERSE_STORAGE_DIR").then(|| storage.clone());

        let mut state = StorefrontState::from_lookup(lookup).unwrap();
        state.toggle_wishlist(&ProductId::new("p2"), true).unwrap();
        drop(state);

        let state = StorefrontState::from_lookup(lookup).unwrap();
        assert!(state.wishlist().contains(&ProductId::new("p2")));
    }

    #[test]
    fn test_from_lookup_rejects_unknown_stock_policy() {
        let result = StorefrontState::from_lookup(|key| {
            (key == "SHOPIVERSE_STOCK_POLICY").then(|| "oversell".to_string())
        });
        assert!(matches!(result, Err(StorefrontError::Config(_))));
    }

    #[test]
    fn test_new_with_missing_catalog() {
        let config = StorefrontConfig {
            catalog_path: Some("/nonexistent/catalog.json".into()),
            ..StorefrontConfig::default()
        };
        assert!(matches!(
            StorefrontState::new(&config),
            Err(StorefrontError::Catalog(_))
        ));
    }
}
