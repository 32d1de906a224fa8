//! Durable key-value storage for the timer board
//!
//! The board is kept as a single JSON document under one key, the way a
//! browser keeps it in local storage. Backends only move strings around;
//! [`Persistence`] owns the document format.

pub mod file;
pub mod memory;
pub mod persistence;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use persistence::{Persistence, STATE_KEY};

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored state is corrupt ({0}); reset all data to recover")]
    Corrupt(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A string key-value store.
///
/// `set` replaces the whole value in one step from the caller's view.
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Read a value, `None` when the key was never written or was removed
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
