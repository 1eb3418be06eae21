//! Basic usage of the cart store.

use cart_kit::{
    backend::InMemoryBackend, error::Result, CartItem, CartNotifier, CartStore, Notice,
};

/// Prints notices the way a storefront would show a toast.
struct ConsoleNotifier;

impl CartNotifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let mark = if notice.is_success() { "✓" } else { "!" };
        println!("   {} {}", mark, notice);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== Cart Kit - Basic Example ===\n");

    println!("1. Opening cart on an in-memory backend...");
    let store = CartStore::new(InMemoryBackend::new()).with_notifier(ConsoleNotifier);
    println!("   ✓ Cart ready (slot: {})\n", store.slot());

    let shirt = CartItem::new("P1", 39000, 5)
        .with_name("Linen shirt")
        .with_code("LS-01")
        .with_image("https://cdn.example/ls-01.jpg");
    let socks = CartItem::new("P2", 8000, 3)
        .with_name("Wool socks")
        .with_code("WS-02");

    println!("2. Adding 2 shirts (stock 5):");
    store.add_item(shirt.clone(), 2).await;

    println!("3. Adding 2 more shirts:");
    store.add_item(shirt.clone(), 2).await;

    println!("4. Adding 3 more shirts (4 + 3 > 5):");
    store.add_item(shirt, 3).await;

    println!("5. Adding 10 socks (stock 3, clamped):");
    store.add_item(socks, 10).await;

    println!("\n6. Cart contents:");
    for line in store.get_items().await {
        println!(
            "   {:<12} x{:<3} {:>8}",
            line.product_name,
            line.quantity,
            line.subtotal()
        );
    }
    println!("   items in cart: {}", store.get_item_count().await);

    println!("\n7. Clearing the cart...");
    store.clear().await?;
    println!("   ✓ items in cart: {}\n", store.get_item_count().await);

    Ok(())
}
