//! Two browsing contexts sharing one file-backed slot.
//!
//! Sequential operations see each other's writes. A context that writes an
//! outdated copy of the cart silently discards the other context's update:
//! the slot has no lock and no version, so the last write wins.

use cart_kit::backend::{FileBackend, FileConfig, StorageBackend};
use cart_kit::{error::Result, CartItem, CartStore, LoadOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();

    let dir = std::env::temp_dir().join("cart-kit-demo");
    let backend = FileBackend::open(FileConfig::new(&dir)).await?;

    let tab_a = CartStore::new(backend.clone());
    let tab_b = CartStore::new(backend.clone());
    tab_a.clear().await?;

    println!("\n=== Cart Kit - Shared Contexts ===\n");
    println!("Slot file: {}\n", backend.slot_path(tab_a.slot()).display());

    tab_a.add_item(CartItem::new("P1", 12000, 5), 2).await;
    tab_b.add_item(CartItem::new("P1", 12000, 5), 2).await;
    println!("1. A and B each add 2 -> A sees {}", tab_a.get_item_count().await);

    let stale = backend.get(tab_a.slot()).await?.unwrap_or_default();
    tab_b.add_item(CartItem::new("P2", 5000, 9), 1).await;
    println!("2. B adds P2       -> B sees {}", tab_b.get_item_count().await);

    backend.set(tab_a.slot(), stale).await?;
    println!("3. A writes stale  -> B sees {}", tab_b.get_item_count().await);

    backend.set(tab_a.slot(), b"{ corrupted".to_vec()).await?;
    if let LoadOutcome::Recovered { reason } = tab_a.load().await {
        println!("4. Corrupt slot    -> treated as empty ({})", reason);
    }

    tab_a.clear().await?;
    println!();
    Ok(())
}
