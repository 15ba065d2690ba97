//! Shopiverse storefront engine.
//!
//! Client-side state for a small electronics storefront: a read-only product
//! catalog, a shopping cart, and a wishlist, each persisted to a local
//! key-value store and observable through event callbacks.
//!
//! Most callers build a [`state::StorefrontState`] from
//! [`config::StorefrontConfig`] and drive everything through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod wishlist;

pub use cart::{CartEngine, CartError, CartLineItem, LineKey, StockPolicy};
pub use catalog::{CatalogError, CatalogStore};
pub use error::{Result, StorefrontError};
pub use events::{Notice, StorefrontEvent};
pub use state::StorefrontState;
pub use wishlist::WishlistEngine;
