//! Key-value persistence for cart and wishlist snapshots.
//!
//! The host environment supplies a [`KeyValueStore`]; the engines only ever
//! write whole snapshots under the fixed [`keys`]. Two implementations ship
//! with the crate:
//!
//! - [`MemoryStore`] - process-local map, used when no storage directory is
//!   configured and throughout the tests
//! - [`FileStore`] - one file per key in a directory on the local device
//!
//! Snapshot encoding lives in [`snapshot`].

mod file;
mod memory;
pub mod snapshot;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Fixed storage keys.
pub mod keys {
    /// Key for the serialized cart line items.
    pub const CART: &str = "cart";

    /// Key for the serialized wishlist product IDs.
    pub const WISHLIST: &str = "wishlist";
}

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters the backend cannot store.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A previous writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Byte-string storage addressed by string keys.
///
/// Methods take `&self` so a single store can be shared between the cart and
/// wishlist engines behind an `Arc`.
pub trait KeyValueStore: std::fmt::Debug + Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
