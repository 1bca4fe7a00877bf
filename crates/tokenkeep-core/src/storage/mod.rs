//! Storage substrate for the session token.
//!
//! This module provides:
//! - `Storage`: a synchronous, string-valued key-value interface
//! - `MemoryStorage`: an in-memory substrate shared between clones
//! - `FileStorage`: a durable, origin-scoped substrate backed by a JSON file
//!
//! The substrate is shared state: other code holding a handle to the same
//! substrate may read, write or remove keys at any time.

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Synchronous key-value store holding string values.
pub trait Storage {
    /// Check whether a value is stored under `key`
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
