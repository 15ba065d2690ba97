//! Integration tests for Shopiverse.
//!
//! The tests under `tests/` drive the storefront engines the way the
//! presentation layer does: through [`StorefrontState`] or the engines
//! directly, against an in-memory or on-disk store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopiverse-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_engine` - cart scenarios and quantity/total properties
//! - `wishlist_engine` - wishlist scenarios and idempotence properties
//! - `persistence` - snapshots surviving a restart, corrupt snapshot recovery

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use shopiverse_core::{Product, ProductId};
use shopiverse_storefront::catalog::CatalogStore;
use shopiverse_storefront::events::StorefrontEvent;
use shopiverse_storefront::storage::{KeyValueStore, MemoryStore};
use shopiverse_storefront::{StockPolicy, StorefrontState};

/// The bundled catalog.
///
/// # Panics
///
/// Panics if the bundled catalog fails to load.
#[must_use]
pub fn catalog() -> CatalogStore {
    CatalogStore::builtin().expect("bundled catalog must load")
}

/// A copy of catalog product `id`.
///
/// # Panics
///
/// Panics if `id` is not in the bundled catalog.
#[must_use]
pub fn product(id: &str) -> Product {
    catalog()
        .product(&ProductId::new(id))
        .cloned()
        .expect("product must exist in the bundled catalog")
}

/// Fresh state over an empty in-memory store, returning the store too.
#[must_use]
pub fn memory_state(policy: StockPolicy) -> (Arc<MemoryStore>, StorefrontState) {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn KeyValueStore> = store.clone();
    (store, StorefrontState::from_parts(catalog(), shared, policy))
}

/// Collects every event delivered to a subscription.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<StorefrontEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that appends to this log.
    pub fn recorder(&self) -> impl Fn(&StorefrontEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event| events.borrow_mut().push(event.clone())
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<StorefrontEvent> {
        self.events.borrow().clone()
    }

    /// Rendered notice messages, in order.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                StorefrontEvent::Notice(notice) => Some(notice.message()),
                _ => None,
            })
            .collect()
    }
}
