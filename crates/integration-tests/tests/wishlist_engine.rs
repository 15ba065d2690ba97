//! Wishlist scenarios and idempotence properties.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use shopiverse_core::ProductId;
use shopiverse_integration_tests::{EventLog, catalog, memory_state};
use shopiverse_storefront::StockPolicy;
use shopiverse_storefront::catalog::ProductFilter;
use shopiverse_storefront::storage::MemoryStore;
use shopiverse_storefront::wishlist::WishlistEngine;

fn fresh_wishlist() -> WishlistEngine {
    WishlistEngine::restore(Arc::new(MemoryStore::new()), catalog())
}

fn contents(wishlist: &WishlistEngine) -> BTreeSet<ProductId> {
    wishlist.iter().cloned().collect()
}

#[test]
fn test_save_then_clear() {
    let mut wishlist = fresh_wishlist();
    let speaker = ProductId::new("p3");

    wishlist.toggle(&speaker, true);
    assert!(wishlist.contains(&speaker));
    assert_eq!(wishlist.len(), 1);

    wishlist.clear();
    assert_eq!(wishlist.len(), 0);
}

#[test]
fn test_wishlist_listing_follows_catalog_order() {
    let (_, mut state) = memory_state(StockPolicy::Clamp);
    for id in ["p8", "p2", "p5"] {
        state.toggle_wishlist(&ProductId::new(id), true).unwrap();
    }

    let cards = state.listing(&ProductFilter::Wishlist);
    let ids: Vec<&str> = cards.iter().map(|c| c.product.id.as_str()).collect();
    assert_eq!(ids, ["p2", "p5", "p8"]);

    let headphones = state.listing(&ProductFilter::Category("headphones".to_string()));
    let flags: Vec<(&str, bool)> = headphones
        .iter()
        .map(|c| (c.product.id.as_str(), c.in_wishlist))
        .collect();
    assert_eq!(flags, [("p1", false), ("p5", true)]);
}

#[test]
fn test_wishlist_and_cart_are_independent() {
    let (_, mut state) = memory_state(StockPolicy::Clamp);
    state.toggle_wishlist(&ProductId::new("p6"), true).unwrap();
    state.add_to_cart(&ProductId::new("p6"), 1, None).unwrap();

    state.cart_mut().clear();
    assert!(state.wishlist().contains(&ProductId::new("p6")));

    state.wishlist_mut().clear();
    state.add_to_cart(&ProductId::new("p6"), 1, None).unwrap();
    assert_eq!(state.cart().total_items(), 1);
}

#[test]
fn test_wishlist_notices() {
    let (_, mut state) = memory_state(StockPolicy::Clamp);
    let log = EventLog::new();
    state.subscribe(log.recorder());

    state.toggle_wishlist(&ProductId::new("p2"), true).unwrap();
    state.toggle_wishlist(&ProductId::new("p2"), false).unwrap();
    state.wishlist_mut().clear();

    assert_eq!(
        log.notices(),
        [
            "Smart Watch Series 5 added to wishlist",
            "Smart Watch Series 5 removed from wishlist",
            "Wishlist cleared successfully",
        ]
    );
}

fn product_id() -> impl Strategy<Value = ProductId> {
    (1u8..=8).prop_map(|n| ProductId::new(format!("p{n}")))
}

proptest! {
    #[test]
    fn prop_repeated_toggle_is_idempotent(
        initial in prop::collection::vec(product_id(), 0..6),
        id in product_id(),
        saved in any::<bool>(),
    ) {
        let mut wishlist = fresh_wishlist();
        for existing in &initial {
            wishlist.toggle(existing, true);
        }

        wishlist.toggle(&id, saved);
        let once = contents(&wishlist);
        wishlist.toggle(&id, saved);
        prop_assert_eq!(contents(&wishlist), once);
    }

    #[test]
    fn prop_opposite_toggles_restore_original(
        initial in prop::collection::vec(product_id(), 0..6),
        id in product_id(),
    ) {
        let mut wishlist = fresh_wishlist();
        for existing in &initial {
            wishlist.toggle(existing, true);
        }
        let original = contents(&wishlist);
        let was_saved = wishlist.contains(&id);

        wishlist.toggle(&id, !was_saved);
        wishlist.toggle(&id, was_saved);
        prop_assert_eq!(contents(&wishlist), original);
    }
}
