//! User-visible notices raised by `add_item`.
//!
//! The store never raises on an add. It returns a boolean and hands one
//! [`Notice`] to its [`CartNotifier`]: a confirmation, a stock warning naming
//! the maximum quantity, or a generic failure. UIs plug in their own
//! notifier (toast, flash message); the default one writes to the log.

use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The product is in the cart with `quantity` units.
    Added { product_id: String, quantity: u32 },
    /// The add would exceed the stock ceiling; nothing changed.
    StockLimit { product_id: String, max: u32 },
    /// The add was refused because the quantity was not usable.
    Invalid { product_id: String },
    /// The cart could not be saved.
    Failed { product_id: String },
}

impl Notice {
    pub fn product_id(&self) -> &str {
        match self {
            Notice::Added { product_id, .. }
            | Notice::StockLimit { product_id, .. }
            | Notice::Invalid { product_id }
            | Notice::Failed { product_id } => product_id,
        }
    }

    /// Whether the notice reports a successful add.
    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Added { .. })
    }

    /// Short text for display.
    pub fn message(&self) -> String {
        match self {
            Notice::Added { .. } => "Added to cart.".to_string(),
            Notice::StockLimit { max, .. } => {
                format!("You can order at most {} of this product.", max)
            }
            Notice::Invalid { .. } => "Please choose a quantity of at least 1.".to_string(),
            Notice::Failed { .. } => "Could not add to cart. Please try again.".to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Receives notices from the store.
pub trait CartNotifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<N: CartNotifier + ?Sized> CartNotifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

/// Default notifier: routes notices to the log at a matching level.
#[derive(Clone, Default)]
pub struct LogNotifier;

impl CartNotifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Added { product_id, quantity } => {
                info!("{} ({} x{})", notice, product_id, quantity)
            }
            Notice::StockLimit { product_id, .. } | Notice::Invalid { product_id } => {
                warn!("{} ({})", notice, product_id)
            }
            Notice::Failed { product_id } => error!("{} ({})", notice, product_id),
        }
    }
}
