//! In-memory slot backend (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding. Slots live
//! as long as the backend (and its clones) do.

use super::StorageBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe async in-memory slot backend.
///
/// Clones share the same map, so two stores built from clones of one
/// backend see each other's writes. This is how tests model two browsing
/// contexts sharing one storage scope.
///
/// # Example
///
/// ```no_run
/// use cart_kit::backend::{InMemoryBackend, StorageBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///
///     backend.set("cart", b"[]".to_vec()).await?;
///
///     let value = backend.get("cart").await?;
///     assert!(value.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend.
    pub fn new() -> Self {
        InMemoryBackend {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Get the current number of slots.
    pub async fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if no slot is stored.
    pub async fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get memory statistics.
    pub async fn stats(&self) -> SlotStats {
        let total_bytes: usize = self.store.iter().map(|entry| entry.value().len()).sum();

        SlotStats {
            total_slots: self.store.len(),
            total_bytes,
        }
    }

    /// Print slot statistics to debug log.
    pub async fn log_stats(&self) {
        let stats = self.stats().await;
        debug!(
            "Slot Stats: {} slots, {} bytes",
            stats.total_slots, stats.total_bytes
        );
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    async fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        let value = self.store.get(slot).map(|entry| entry.value().clone());
        if value.is_some() {
            debug!("✓ InMemory GET {} -> HIT", slot);
        } else {
            debug!("✓ InMemory GET {} -> MISS", slot);
        }
        Ok(value)
    }

    async fn set(&self, slot: &str, value: Vec<u8>) -> Result<()> {
        let len = value.len();
        self.store.insert(slot.to_string(), value);
        debug!("✓ InMemory SET {} ({} bytes)", slot, len);
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<()> {
        self.store.remove(slot);
        debug!("✓ InMemory DELETE {}", slot);
        Ok(())
    }

    async fn exists(&self, slot: &str) -> Result<bool> {
        Ok(self.store.contains_key(slot))
    }
}

/// Slot statistics.
#[derive(Clone, Debug)]
pub struct SlotStats {
    pub total_slots: usize,
    pub total_bytes: usize,
}
