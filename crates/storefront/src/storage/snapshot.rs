//! Whole-collection JSON snapshots.
//!
//! Engines write their complete state on every mutation and read it back
//! once at startup. A snapshot is an advisory cache: callers decide how to
//! recover from [`SnapshotError`], and the engines always fall back to an
//! empty collection.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{KeyValueStore, StorageError};

/// Errors reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored bytes are not a valid snapshot.
    #[error("Malformed snapshot under {key:?}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be encoded.
    #[error("Failed to encode snapshot under {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode the snapshot stored under `key`.
///
/// Returns `Ok(None)` when nothing has been stored yet.
///
/// # Errors
///
/// Returns `SnapshotError::Storage` if the store cannot be read, or
/// `SnapshotError::Parse` if the stored bytes do not decode as `T`.
pub fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, SnapshotError> {
    let Some(bytes) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| SnapshotError::Parse {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` and store it under `key`, replacing any previous snapshot.
///
/// # Errors
///
/// Returns `SnapshotError::Encode` if serialization fails or
/// `SnapshotError::Storage` if the store cannot be written.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), SnapshotError> {
    let bytes = serde_json::to_vec(value).map_err(|source| SnapshotError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &bytes)?;
    Ok(())
}
