//! Key-value storage contract for the persisted cart.
//!
//! The cart only needs an opaque string store: read one key, overwrite one
//! key, drop one key. Backends implement [`KeyValueStore`]; the store holds
//! them as `Arc<dyn KeyValueStore>` so callers choose the backend at startup.

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or device I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend's own on-disk format could not be read or written.
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// An asynchronous string-keyed, string-valued store.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key.
    async fn clear(&self) -> Result<(), StorageError>;
}
