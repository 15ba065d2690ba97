//! Snapshots surviving a restart and recovery from corrupt snapshots.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use shopiverse_core::{ProductId, VariantId};
use shopiverse_integration_tests::{catalog, memory_state};
use shopiverse_storefront::StockPolicy;
use shopiverse_storefront::config::StorefrontConfig;
use shopiverse_storefront::state::StorefrontState;
use shopiverse_storefront::storage::{FileStore, KeyValueStore, MemoryStore, keys};

fn file_config(dir: &std::path::Path) -> StorefrontConfig {
    StorefrontConfig {
        storage_dir: Some(dir.to_path_buf()),
        ..StorefrontConfig::default()
    }
}

#[test]
fn test_state_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    let (items, saved) = {
        let mut state = StorefrontState::new(&config).unwrap();
        state
            .add_to_cart(&ProductId::new("p1"), 2, Some(&VariantId::new("v2")))
            .unwrap();
        state.add_to_cart(&ProductId::new("p5"), 1, None).unwrap();
        state.toggle_wishlist(&ProductId::new("p3"), true).unwrap();
        state.toggle_wishlist(&ProductId::new("p7"), true).unwrap();
        (
            state.cart().items().to_vec(),
            state.wishlist().iter().cloned().collect::<Vec<_>>(),
        )
    };

    let restored = StorefrontState::new(&config).unwrap();
    assert_eq!(restored.cart().items(), items.as_slice());
    assert_eq!(restored.wishlist().iter().cloned().collect::<Vec<_>>(), saved);
    assert!(!restored.cart().is_open());
}

#[test]
fn test_snapshot_files_use_fixed_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = StorefrontState::new(&file_config(dir.path())).unwrap();
    state.add_to_cart(&ProductId::new("p4"), 1, None).unwrap();
    state.toggle_wishlist(&ProductId::new("p4"), true).unwrap();

    let wishlist = std::fs::read_to_string(dir.path().join("wishlist.json")).unwrap();
    assert_eq!(wishlist, "[\"p4\"]");

    let cart: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("cart.json")).unwrap())
            .unwrap();
    assert_eq!(cart[0]["product"]["name"], "Wireless Charging Pad");
    assert!(cart[0]["product"]["price"].is_number());
    assert_eq!(cart[0]["quantity"], 1);
}

#[test]
fn test_cart_lines_keep_product_as_added() {
    let (store, mut state) = memory_state(StockPolicy::Clamp);
    state.add_to_cart(&ProductId::new("p6"), 1, None).unwrap();

    // A later catalog with a new price does not touch stored lines.
    let mut products = catalog().products().to_vec();
    if let Some(speaker) = products.iter_mut().find(|p| p.id.as_str() == "p6") {
        speaker.price = rust_decimal::Decimal::from(99);
    }
    let repriced = shopiverse_storefront::CatalogStore::from_parts(
        catalog().categories().to_vec(),
        products,
    )
    .unwrap();

    let restored = StorefrontState::from_parts(repriced, store, StockPolicy::Clamp);
    assert_eq!(
        restored.cart().total_price(),
        rust_decimal::Decimal::new(17_999, 2)
    );
}

#[test]
fn test_corrupt_snapshots_fall_back_to_empty() {
    let store = Arc::new(MemoryStore::with_entries([
        (keys::CART, "not json"),
        (keys::WISHLIST, "[1, 2, 3]"),
    ]));

    let mut state = StorefrontState::from_parts(catalog(), store.clone(), StockPolicy::Clamp);
    assert!(state.cart().is_empty());
    assert!(state.wishlist().is_empty());

    // The next mutation overwrites the corrupt snapshot.
    state.add_to_cart(&ProductId::new("p3"), 1, None).unwrap();
    let restored = StorefrontState::from_parts(catalog(), store, StockPolicy::Clamp);
    assert_eq!(restored.cart().total_items(), 1);
}

#[test]
fn test_file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    assert!(store.set("../escape", b"[]").is_err());
    assert!(store.get("cart").unwrap().is_none());
}
