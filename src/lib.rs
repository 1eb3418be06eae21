//! # cart-kit
//!
//! A persisted storefront cart with per-line stock ceilings over pluggable
//! storage backends.
//!
//! ## Features
//!
//! - **One owner:** [`CartStore`] is the only reader and writer of its slot
//! - **Stock ceilings:** merging into an existing line past its stock is
//!   refused; a first add is clamped to the stock
//! - **Fail-soft reads:** an absent or unreadable slot reads as an empty cart
//! - **Backend Agnostic:** in-memory, file and Redis backends, or your own
//! - **Legacy layout:** reads and writes the storefront's JSON array, with an
//!   optional versioned binary envelope
//!
//! ## Quick Start
//!
//! ```ignore
//! use cart_kit::{backend::InMemoryBackend, CartItem, CartStore};
//!
//! let store = CartStore::new(InMemoryBackend::new());
//!
//! let item = CartItem::new("P1", 12000, 5).with_name("Linen shirt");
//! assert!(store.add_item(item.clone(), 2).await);   // [P1 x2]
//! assert!(store.add_item(item.clone(), 2).await);   // [P1 x4]
//! assert!(!store.add_item(item, 3).await);          // 4 + 3 > 5, refused
//!
//! assert_eq!(store.get_item_count().await, 4);
//! ```
//!
//! ## Sharing
//!
//! Stores are `Clone`; clones share the backend. Two contexts writing the
//! same slot concurrently are not coordinated: the last write wins.

#[macro_use]
extern crate log;

pub mod api_docs;
pub mod backend;
pub mod cart;
pub mod config;
pub mod error;
pub mod notify;
pub mod observability;
pub mod serialization;
pub mod store;

// Re-exports for convenience
pub use backend::StorageBackend;
pub use cart::{Cart, CartItem, CartLine, MergeOutcome};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use notify::{CartNotifier, Notice};
pub use store::{CartStore, LoadOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
