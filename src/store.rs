//! Cart store - the only reader and writer of the persisted cart slot.
//!
//! Every operation does a full load → (mutate) → store cycle against the
//! backend. Nothing is cached between calls, so operations issued one after
//! another from the same context always see their own writes.
//!
//! Clones of a store (or stores built over clones of one backend) share the
//! slot like browsing contexts sharing one storage scope. There is no lock
//! and no version check: when two contexts interleave their read and write,
//! the last write wins and the other update is lost.

use crate::backend::StorageBackend;
use crate::cart::{Cart, CartItem, CartLine, MergeOutcome};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::notify::{CartNotifier, LogNotifier, Notice};
use crate::observability::{CartMetrics, NoOpMetrics};
use crate::serialization::{decode_cart, encode_cart};
use std::sync::Arc;
use std::time::Instant;

/// Result of reading the slot.
///
/// Decoding never fails outward: a blob that cannot be read as a cart is
/// reported as `Recovered` and treated as an empty cart.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// Slot absent (never written, or cleared).
    Empty,
    /// Slot decoded.
    Loaded(Cart),
    /// Slot unreadable; an empty cart stands in for it.
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }

    /// The cart this outcome stands for.
    pub fn into_cart(self) -> Cart {
        match self {
            LoadOutcome::Loaded(cart) => cart,
            LoadOutcome::Empty | LoadOutcome::Recovered { .. } => Cart::new(),
        }
    }
}

/// Persisted cart over a [`StorageBackend`].
///
/// # Example
///
/// ```no_run
/// use cart_kit::{backend::InMemoryBackend, CartItem, CartStore};
///
/// # async fn example() {
/// let store = CartStore::new(InMemoryBackend::new());
///
/// let shirt = CartItem::new("P1", 12000, 5).with_name("Linen shirt");
/// assert!(store.add_item(shirt, 2).await);
/// assert_eq!(store.get_item_count().await, 2);
/// # }
/// ```
#[derive(Clone)]
pub struct CartStore<B: StorageBackend> {
    backend: B,
    config: StoreConfig,
    slot: String,
    metrics: Arc<dyn CartMetrics>,
    notifier: Arc<dyn CartNotifier>,
}

impl<B: StorageBackend> CartStore<B> {
    /// Create a store on the default slot, writing the legacy JSON layout.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    pub fn with_config(backend: B, config: StoreConfig) -> Self {
        let slot = config.slot_key();
        CartStore {
            backend,
            config,
            slot,
            metrics: Arc::new(NoOpMetrics),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: impl CartMetrics + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    /// Set the receiver of user-visible notices.
    pub fn with_notifier(mut self, notifier: impl CartNotifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Full backend key of the slot.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Add `quantity` units of `item`.
    ///
    /// Returns `true` when the cart was saved. On `false` nothing was
    /// written. Either way one notice goes to the notifier:
    ///
    /// - `Notice::Added`: saved
    /// - `Notice::StockLimit`: the merge would pass the stock ceiling
    /// - `Notice::Invalid`: `quantity` is zero
    /// - `Notice::Failed`: the slot could not be read or written
    pub async fn add_item(&self, item: CartItem, quantity: u32) -> bool {
        let product_id = item.product_id.clone();

        let notice = match self.try_add_item(item, quantity).await {
            Ok(outcome) => Notice::Added {
                product_id,
                quantity: outcome.quantity(),
            },
            Err(Error::StockExceeded { max, .. }) => Notice::StockLimit { product_id, max },
            Err(Error::ValidationError(_)) => Notice::Invalid { product_id },
            Err(e) => {
                debug!("Cart add failed for {} in {}: {}", product_id, self.slot, e);
                Notice::Failed { product_id }
            }
        };

        let added = notice.is_success();
        self.notifier.notify(notice);
        added
    }

    /// Add a single unit of `item`.
    pub async fn add_one(&self, item: CartItem) -> bool {
        self.add_item(item, 1).await
    }

    /// Add `quantity` units of `item`, reporting the typed outcome.
    ///
    /// Same semantics as [`add_item`](Self::add_item) without notices.
    ///
    /// # Errors
    ///
    /// - `Error::ValidationError`: `quantity` is zero
    /// - `Error::StockExceeded`: the line would pass its stock ceiling
    /// - `Error::BackendError`: the slot could not be read or written
    /// - `Error::SerializationError`: the cart could not be encoded
    pub async fn try_add_item(&self, item: CartItem, quantity: u32) -> Result<MergeOutcome> {
        let mut cart = self.read().await?.into_cart();

        let product_id = item.product_id.clone();
        let outcome = cart.merge(item, quantity).map_err(|e| {
            self.metrics
                .record_rejected(&self.slot, &product_id, &e.to_string());
            e
        })?;

        self.save(&cart).await?;
        debug!(
            "✓ Cart {}: {} -> {:?} ({} lines)",
            self.slot,
            product_id,
            outcome,
            cart.len()
        );
        Ok(outcome)
    }

    /// Lines in storage order; empty when the slot is absent or unreadable.
    pub async fn get_items(&self) -> Vec<CartLine> {
        self.load().await.into_cart().into_lines()
    }

    /// Sum of quantities across all lines; `0` when the slot is unreadable.
    pub async fn get_item_count(&self) -> u64 {
        self.load().await.into_cart().item_count()
    }

    /// Read the slot without ever failing.
    ///
    /// Backend read errors as well as decode errors come back as
    /// `LoadOutcome::Recovered`.
    pub async fn load(&self) -> LoadOutcome {
        match self.read().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.record_recovered(&self.slot, &e.to_string());
                warn!("⚠ Cart {} unreadable, using empty cart: {}", self.slot, e);
                LoadOutcome::Recovered {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Remove the slot. The next read sees an empty cart.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot delete the slot.
    pub async fn clear(&self) -> Result<()> {
        self.backend.delete(&self.slot).await?;
        info!("Cart {} cleared", self.slot);
        Ok(())
    }

    /// Read and decode the slot.
    ///
    /// Only backend errors are returned; a blob that does not decode is a
    /// `Recovered` outcome so that the next write replaces it.
    async fn read(&self) -> Result<LoadOutcome> {
        let timer = Instant::now();

        let bytes = match self.backend.get(&self.slot).await? {
            Some(bytes) => bytes,
            None => return Ok(LoadOutcome::Empty),
        };

        match decode_cart(&bytes) {
            Ok(cart) => {
                self.metrics
                    .record_load(&self.slot, cart.len(), timer.elapsed());
                Ok(LoadOutcome::Loaded(cart))
            }
            Err(e) => {
                self.metrics.record_recovered(&self.slot, &e.to_string());
                warn!(
                    "⚠ Cart {} holds an unreadable blob ({} bytes), treating as empty: {}",
                    self.slot,
                    bytes.len(),
                    e
                );
                Ok(LoadOutcome::Recovered {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let timer = Instant::now();

        let result = match encode_cart(cart, self.config.format) {
            Ok(bytes) => self.backend.set(&self.slot, bytes).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.metrics.record_save(&self.slot, timer.elapsed());
                Ok(())
            }
            Err(e) => {
                self.metrics.record_error(&self.slot, &e.to_string());
                Err(e)
            }
        }
    }
}
