//! Storage backends for the persisted cart slot.

use crate::error::Result;

#[cfg(feature = "file")]
pub mod file;
pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "file")]
pub use file::{FileBackend, FileConfig};
pub use inmemory::InMemoryBackend;
#[cfg(feature = "redis")]
pub use redis::{PoolStats, RedisBackend, RedisConfig};

/// Trait for slot storage implementations.
///
/// A slot is a named byte blob. The store reads and writes whole blobs; a
/// backend never sees a partial cart.
///
/// **IMPORTANT:** All methods use `&self` instead of `&mut self` so clones of
/// a store can share one backend. Implementations use interior mutability
/// or external storage. Clones must address the same underlying storage.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync + Clone {
    /// Read the blob stored in `slot`.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Slot holds a value
    /// - `Ok(None)` - Slot was never written or has been cleared
    ///
    /// # Errors
    /// Returns `Err` if the storage cannot be read.
    async fn get(&self, slot: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored in `slot`.
    ///
    /// # Errors
    /// Returns `Err` if the storage cannot be written (unavailable, full).
    async fn set(&self, slot: &str, value: Vec<u8>) -> Result<()>;

    /// Remove the slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn delete(&self, slot: &str) -> Result<()>;

    /// Check if the slot holds a value.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn exists(&self, slot: &str) -> Result<bool> {
        Ok(self.get(slot).await?.is_some())
    }

    /// Health check - verify backend is accessible.
    ///
    /// # Errors
    /// Returns `Err` if backend is not accessible
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
