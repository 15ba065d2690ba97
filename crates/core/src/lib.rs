//! Shopiverse Core - Shared types library.
//!
//! This crate provides the types shared by every Shopiverse component:
//! - `storefront` - Catalog store, cart and wishlist engines
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! logging. Catalog records are immutable once loaded, so everything here is
//! plain data with serde support.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, and catalog records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
