//! Snapshot persistence for trip state.
//!
//! A [`SnapshotStore`] maps a trip key to one self-contained text snapshot.
//! The store never interprets the contents; serialisation belongs to the
//! caller. Two implementations ship here:
//!
//! - [`FileStore`]: one `<key>.json` file per trip under a directory.
//! - [`MemoryStore`]: an in-process map, for tests and throwaway sessions.

pub mod config;
pub mod fs;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use config::StoreConfig;
pub use fs::FileStore;
pub use memory::MemoryStore;

/// Errors raised by snapshot stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid snapshot key {0:?} (expected ASCII letters, digits, '-' or '_')")]
    InvalidKey(String),

    #[error("no snapshot stored under key {0:?}")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Keyed storage for complete snapshots.
///
/// Writes replace any previous snapshot under the same key in full.
pub trait SnapshotStore {
    /// Store `contents` under `key`, replacing any previous snapshot.
    fn put(&self, key: &str, contents: &str) -> Result<(), StoreError>;

    /// Fetch the snapshot stored under `key`.
    fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Delete the snapshot under `key`. Returns `false` if there was none.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Check that `key` is safe to use as a file stem.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}
