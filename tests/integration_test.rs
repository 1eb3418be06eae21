//! Integration tests for cart-kit
//!
//! These tests drive a `CartStore` end to end through its public API and
//! check the persisted slot directly where it matters.

use cart_kit::backend::{InMemoryBackend, StorageBackend};
use cart_kit::serialization::CartFormat;
use cart_kit::{
    CartItem, CartNotifier, CartStore, Error, LoadOutcome, MergeOutcome, Notice, StoreConfig,
};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Notices(Arc<Mutex<Vec<Notice>>>);

impl Notices {
    fn all(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }
}

impl CartNotifier for Notices {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

/// Backend that can be switched into a failing state.
#[derive(Clone, Default)]
struct FlakyBackend {
    inner: InMemoryBackend,
    fail_writes: Arc<Mutex<bool>>,
    fail_reads: Arc<Mutex<bool>>,
}

impl FlakyBackend {
    fn fail_writes(&self, on: bool) {
        *self.fail_writes.lock().unwrap() = on;
    }

    fn fail_reads(&self, on: bool) {
        *self.fail_reads.lock().unwrap() = on;
    }
}

impl StorageBackend for FlakyBackend {
    async fn get(&self, slot: &str) -> cart_kit::Result<Option<Vec<u8>>> {
        if *self.fail_reads.lock().unwrap() {
            return Err(Error::BackendError("storage unavailable".to_string()));
        }
        self.inner.get(slot).await
    }

    async fn set(&self, slot: &str, value: Vec<u8>) -> cart_kit::Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(Error::BackendError("quota exceeded".to_string()));
        }
        self.inner.set(slot, value).await
    }

    async fn delete(&self, slot: &str) -> cart_kit::Result<()> {
        self.inner.delete(slot).await
    }
}

fn product(id: &str, stock: u32) -> CartItem {
    CartItem::new(id, 15000, stock)
        .with_name(format!("Product {}", id))
        .with_code(format!("SKU-{}", id))
}

fn quantities(lines: &[cart_kit::CartLine]) -> Vec<(String, u32)> {
    lines
        .iter()
        .map(|l| (l.product_id.clone(), l.quantity))
        .collect()
}

/// Test 1: The reference add sequence
///
/// - P1 x2, then x2 more (stock 5) -> 4
/// - P1 x3 more -> refused, stays 4
/// - P2 x10 (stock 3) -> clamped to 3
/// - count = 7
#[tokio::test]
async fn test_reference_add_sequence() {
    let notices = Notices::default();
    let store = CartStore::new(InMemoryBackend::new()).with_notifier(notices.clone());

    assert!(store.add_item(product("P1", 5), 2).await);
    assert_eq!(quantities(&store.get_items().await), vec![("P1".to_string(), 2)]);

    assert!(store.add_item(product("P1", 5), 2).await);
    assert_eq!(quantities(&store.get_items().await), vec![("P1".to_string(), 4)]);

    assert!(!store.add_item(product("P1", 5), 3).await);
    assert_eq!(quantities(&store.get_items().await), vec![("P1".to_string(), 4)]);

    assert!(store.add_item(product("P2", 3), 10).await);
    assert_eq!(
        quantities(&store.get_items().await),
        vec![("P1".to_string(), 4), ("P2".to_string(), 3)]
    );

    assert_eq!(store.get_item_count().await, 7);

    let notices = notices.all();
    assert_eq!(notices.len(), 4);
    assert_eq!(
        notices[2],
        Notice::StockLimit {
            product_id: "P1".to_string(),
            max: 5
        }
    );
    assert_eq!(
        notices[3],
        Notice::Added {
            product_id: "P2".to_string(),
            quantity: 3
        }
    );
}

/// Test 2: Typed outcomes
#[tokio::test]
async fn test_try_add_item_outcomes() {
    let store = CartStore::new(InMemoryBackend::new());

    assert_eq!(
        store.try_add_item(product("P1", 5), 2).await.unwrap(),
        MergeOutcome::Added { quantity: 2 }
    );
    assert_eq!(
        store.try_add_item(product("P1", 5), 1).await.unwrap(),
        MergeOutcome::Merged { quantity: 3 }
    );
    assert_eq!(
        store.try_add_item(product("P2", 2), 9).await.unwrap(),
        MergeOutcome::Clamped {
            requested: 9,
            quantity: 2
        }
    );

    match store.try_add_item(product("P1", 5), 3).await.unwrap_err() {
        Error::StockExceeded {
            product_id,
            requested,
            max,
        } => {
            assert_eq!(product_id, "P1");
            assert_eq!(requested, 6);
            assert_eq!(max, 5);
        }
        e => panic!("Expected StockExceeded, got {:?}", e),
    }
}

/// Test 3: Existing lines keep their display fields
#[tokio::test]
async fn test_merge_does_not_refresh_line_details() {
    let store = CartStore::new(InMemoryBackend::new());
    store.add_item(product("P1", 5), 1).await;

    let repriced = CartItem::new("P1", 9900, 5)
        .with_name("Discounted")
        .with_image("https://cdn.example/p1.jpg");
    assert!(store.add_item(repriced, 1).await);

    let line = &store.get_items().await[0];
    assert_eq!(line.quantity, 2);
    assert_eq!(line.unit_price, 15000);
    assert_eq!(line.product_name, "Product P1");
    assert_eq!(line.image_url, None);
}

/// Test 4: Invalid JSON in the slot reads as an empty cart
#[tokio::test]
async fn test_fail_soft_on_invalid_json() {
    let backend = InMemoryBackend::new();
    backend
        .set("cart", b"[{\"product_id\": \"P1\",".to_vec())
        .await
        .unwrap();
    let store = CartStore::new(backend);

    assert!(store.get_items().await.is_empty());
    assert_eq!(store.get_item_count().await, 0);
    assert!(store.load().await.is_recovered());
}

/// Test 5: A corrupt slot is overwritten by the next add
#[tokio::test]
async fn test_add_replaces_corrupt_slot() {
    let backend = InMemoryBackend::new();
    backend.set("cart", b"\x00\xff garbage".to_vec()).await.unwrap();
    let store = CartStore::new(backend.clone());

    assert!(store.add_item(product("P1", 5), 2).await);

    let raw = backend.get("cart").await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(store.get_item_count().await, 2);
}

/// Test 6: Persistence failure
///
/// A failed write leaves the stored cart as it was and reports `Failed`.
#[tokio::test]
async fn test_write_failure_keeps_previous_cart() {
    let backend = FlakyBackend::default();
    let notices = Notices::default();
    let store = CartStore::new(backend.clone()).with_notifier(notices.clone());

    assert!(store.add_item(product("P1", 5), 1).await);

    backend.fail_writes(true);
    assert!(!store.add_item(product("P1", 5), 1).await);
    assert!(!store.add_item(product("P2", 5), 1).await);

    backend.fail_writes(false);
    assert_eq!(quantities(&store.get_items().await), vec![("P1".to_string(), 1)]);
    assert!(matches!(notices.all()[1], Notice::Failed { .. }));
}

/// Test 7: Read failures
///
/// Reads fail soft; an add refuses rather than overwrite a cart it could
/// not see.
#[tokio::test]
async fn test_read_failure() {
    let backend = FlakyBackend::default();
    let store = CartStore::new(backend.clone());
    store.add_item(product("P1", 5), 3).await;

    backend.fail_reads(true);
    assert!(store.get_items().await.is_empty());
    assert_eq!(store.get_item_count().await, 0);
    assert!(matches!(
        store.load().await,
        LoadOutcome::Recovered { .. }
    ));
    assert!(!store.add_item(product("P2", 5), 1).await);

    backend.fail_reads(false);
    assert_eq!(quantities(&store.get_items().await), vec![("P1".to_string(), 3)]);
}

/// Test 8: Contexts sharing one storage scope see each other's writes
#[tokio::test]
async fn test_shared_backend_read_your_writes() {
    let backend = InMemoryBackend::new();
    let tab_a = CartStore::new(backend.clone());
    let tab_b = CartStore::new(backend);

    tab_a.add_item(product("P1", 5), 2).await;
    tab_b.add_item(product("P1", 5), 2).await;

    assert_eq!(tab_a.get_item_count().await, 4);

    // B is now bounded by what A wrote
    assert!(!tab_b.add_item(product("P1", 5), 2).await);
}

/// Test 9: Last write wins between contexts
///
/// A context that read before another wrote and then writes its own copy
/// discards the other update. This is accepted behaviour, not a bug.
#[tokio::test]
async fn test_last_write_wins() {
    let backend = InMemoryBackend::new();
    let tab_a = CartStore::new(backend.clone());
    let tab_b = CartStore::new(backend.clone());

    tab_a.add_item(product("P1", 5), 1).await;
    let stale = backend.get("cart").await.unwrap().unwrap();

    tab_b.add_item(product("P2", 5), 1).await;
    // A's delayed write of the cart it had read
    backend.set("cart", stale).await.unwrap();

    let ids: Vec<_> = tab_b
        .get_items()
        .await
        .into_iter()
        .map(|l| l.product_id)
        .collect();
    assert_eq!(ids, vec!["P1"]);
}

/// Test 10: Namespaces isolate carts on one backend
#[tokio::test]
async fn test_namespaces_isolate_carts() {
    let backend = InMemoryBackend::new();
    let kr = CartStore::with_config(backend.clone(), StoreConfig::default().with_namespace("kr"));
    let us = CartStore::with_config(backend.clone(), StoreConfig::default().with_namespace("us"));

    kr.add_item(product("P1", 5), 2).await;
    us.add_item(product("P1", 5), 5).await;

    assert_eq!(kr.get_item_count().await, 2);
    assert_eq!(us.get_item_count().await, 5);
    assert_eq!(backend.len().await, 2);
}

/// Test 11: Switching a slot from JSON to the envelope keeps its contents
#[tokio::test]
async fn test_format_migration() {
    let backend = InMemoryBackend::new();
    let legacy = CartStore::new(backend.clone());
    legacy.add_item(product("P1", 5), 2).await;

    let enveloped = CartStore::with_config(
        backend.clone(),
        StoreConfig::default().with_format(CartFormat::Envelope),
    );
    assert_eq!(enveloped.get_item_count().await, 2);

    enveloped.add_item(product("P2", 5), 1).await;
    let raw = backend.get("cart").await.unwrap().unwrap();
    assert_eq!(&raw[0..4], b"CART");

    // and the JSON store still reads it
    assert_eq!(legacy.get_item_count().await, 3);
}

/// Test 12: File backend survives a "restart"
#[cfg(feature = "file")]
#[tokio::test]
async fn test_file_backend_persists_across_stores() {
    use cart_kit::backend::{FileBackend, FileConfig};

    let dir = tempfile::tempdir().unwrap();

    {
        let backend = FileBackend::open(FileConfig::new(dir.path())).await.unwrap();
        let store = CartStore::new(backend);
        store.add_item(product("P1", 5), 2).await;
        store.add_item(product("P2", 3), 10).await;
    }

    let backend = FileBackend::open(FileConfig::new(dir.path())).await.unwrap();
    let store = CartStore::new(backend);
    assert_eq!(store.get_item_count().await, 5);

    store.clear().await.unwrap();
    assert!(store.get_items().await.is_empty());
}

/// Test 13: Concurrent adds on one store keep the cart well-formed
///
/// Interleaved read-modify-write cycles may lose updates, but the slot always
/// holds a valid cart with one line per product.
#[tokio::test]
async fn test_concurrent_adds_keep_cart_valid() {
    let store = CartStore::new(InMemoryBackend::new());

    let a = store.clone();
    let b = store.clone();
    tokio::join!(
        async {
            for _ in 0..20 {
                a.add_item(product("P1", 100), 1).await;
            }
        },
        async {
            for _ in 0..20 {
                b.add_item(product("P1", 100), 1).await;
            }
        },
    );

    let items = store.get_items().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].quantity >= 1 && items[0].quantity <= 40);
    assert!(matches!(store.load().await, LoadOutcome::Loaded(_)));
}

/// Test 14: A restock between adds keeps the whole cart readable
///
/// The merge is checked against the current stock, and the stored line takes
/// that stock as its new ceiling. Otherwise the slot would hold
/// `quantity > stock` and fail to load on the next read.
#[tokio::test]
async fn test_merge_after_restock_keeps_cart() {
    let backend = InMemoryBackend::new();
    let store = CartStore::new(backend.clone());

    assert!(store.add_item(product("P0", 9), 2).await);
    assert!(store.add_item(product("P1", 5), 5).await);
    assert!(store.add_item(product("P1", 10), 3).await);

    let lines = store.get_items().await;
    assert_eq!(
        quantities(&lines),
        vec![("P0".to_string(), 2), ("P1".to_string(), 8)]
    );
    assert_eq!(lines[1].stock_ceiling, 10);
    assert_eq!(store.get_item_count().await, 10);
    assert!(!store.load().await.is_recovered());

    let raw = backend.get(store.slot()).await.unwrap().unwrap();
    let written: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(written[1]["quantity"], 8);
    assert_eq!(written[1]["stock"], 10);

    // stock drops back below the line: refused, ceiling untouched
    assert!(!store.add_item(product("P1", 8), 1).await);
    assert_eq!(store.get_items().await[1].stock_ceiling, 10);
}
