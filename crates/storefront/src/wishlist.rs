//! Wishlist engine: a persisted set of saved product IDs.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use shopiverse_core::ProductId;

use crate::catalog::CatalogStore;
use crate::error::add_breadcrumb;
use crate::events::{Notice, StorefrontEvent, SubscriptionId, Subscribers};
use crate::storage::{KeyValueStore, keys, snapshot};

/// Saved product IDs plus their persistence mirror.
///
/// Each ID appears at most once. Iteration order is the IDs' sort order and
/// carries no meaning; listings use catalog order.
#[derive(Debug)]
pub struct WishlistEngine {
    store: Arc<dyn KeyValueStore>,
    catalog: CatalogStore,
    saved: BTreeSet<ProductId>,
    subscribers: Subscribers,
}

impl WishlistEngine {
    /// Create an engine, rehydrating any wishlist previously saved in `store`.
    ///
    /// The catalog is only used to name products in notices. A malformed
    /// snapshot is logged and replaced by an empty wishlist.
    #[must_use]
    pub fn restore(store: Arc<dyn KeyValueStore>, catalog: CatalogStore) -> Self {
        let saved = match snapshot::load::<BTreeSet<ProductId>>(store.as_ref(), keys::WISHLIST) {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore wishlist, starting empty");
                BTreeSet::new()
            }
        };
        tracing::info!(saved = saved.len(), "Wishlist restored");

        Self {
            store,
            catalog,
            saved,
            subscribers: Subscribers::new(),
        }
    }

    /// Whether `product_id` is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.saved.contains(product_id)
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Saved IDs in sort order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.saved.iter()
    }

    /// Save (`saved = true`) or unsave a product.
    ///
    /// Idempotent: saving a saved ID or unsaving an absent one leaves the set
    /// untouched and skips the write, though a notice reflecting the resulting
    /// state is still published. Returns whether the set changed.
    #[instrument(skip(self))]
    pub fn toggle(&mut self, product_id: &ProductId, saved: bool) -> bool {
        let changed = if saved {
            self.saved.insert(product_id.clone())
        } else {
            self.saved.remove(product_id)
        };

        let product_name = self.product_name(product_id);
        if changed {
            tracing::info!(saved, "Wishlist updated");
            add_breadcrumb(
                "wishlist",
                if saved {
                    "Saved product to wishlist"
                } else {
                    "Removed product from wishlist"
                },
                Some(&[("product_id", product_id.as_str())]),
            );
            self.changed();
        }

        self.subscribers.notify(if saved {
            Notice::AddedToWishlist { product_name }
        } else {
            Notice::RemovedFromWishlist { product_name }
        });
        changed
    }

    /// Remove every saved ID.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        let removed = self.saved.len();
        self.saved.clear();
        tracing::info!(removed, "Wishlist cleared");
        add_breadcrumb("wishlist", "Cleared wishlist", None);

        self.changed();
        self.subscribers.notify(Notice::WishlistCleared);
    }

    /// Register a callback for wishlist events.
    pub fn subscribe(&mut self, callback: impl Fn(&StorefrontEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn product_name(&self, product_id: &ProductId) -> String {
        self.catalog
            .product(product_id)
            .map_or_else(|| product_id.to_string(), |p| p.name.clone())
    }

    fn changed(&self) {
        if let Err(e) = snapshot::save(self.store.as_ref(), keys::WISHLIST, &self.saved) {
            tracing::error!(error = %e, "Failed to persist wishlist");
        }
        self.subscribers.publish(&StorefrontEvent::WishlistChanged);
    }
}
