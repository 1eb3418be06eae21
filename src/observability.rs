//! Metrics hooks for cart store operations.
//!
//! Implement [`CartMetrics`] to feed your monitoring system:
//!
//! ```ignore
//! use cart_kit::observability::CartMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl CartMetrics for PrometheusMetrics {
//!     fn record_save(&self, slot: &str, duration: Duration) {
//!         // histogram!("cart_save_latency").record(duration);
//!     }
//! }
//!
//! // let store = CartStore::new(backend)
//! //     .with_metrics(PrometheusMetrics);
//! ```
//!
//! Every method has a default body that logs through the `log` crate, so an
//! implementation only overrides what it records. [`NoOpMetrics`] silences
//! everything and is what a store starts with.

use std::time::Duration;

/// Trait for cart metrics collection.
pub trait CartMetrics: Send + Sync {
    /// A slot was read and decoded.
    fn record_load(&self, slot: &str, lines: usize, duration: Duration) {
        debug!("Cart LOAD: {} ({} lines) took {:?}", slot, lines, duration);
    }

    /// A slot could not be read or decoded and was treated as empty.
    fn record_recovered(&self, slot: &str, reason: &str) {
        warn!("Cart RECOVERED: {} treated as empty: {}", slot, reason);
    }

    /// A cart was written back.
    fn record_save(&self, slot: &str, duration: Duration) {
        debug!("Cart SAVE: {} took {:?}", slot, duration);
    }

    /// An add was refused (stock ceiling, invalid quantity).
    fn record_rejected(&self, slot: &str, product_id: &str, reason: &str) {
        info!("Cart REJECTED: {} {}: {}", slot, product_id, reason);
    }

    /// A write failed.
    fn record_error(&self, slot: &str, error: &str) {
        warn!("Cart ERROR for {}: {}", slot, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CartMetrics for NoOpMetrics {
    fn record_load(&self, _slot: &str, _lines: usize, _duration: Duration) {}
    fn record_recovered(&self, _slot: &str, _reason: &str) {}
    fn record_save(&self, _slot: &str, _duration: Duration) {}
    fn record_rejected(&self, _slot: &str, _product_id: &str, _reason: &str) {}
    fn record_error(&self, _slot: &str, _error: &str) {}
}

/// Metrics that only log, using the trait's default bodies.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl CartMetrics for LogMetrics {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_metrics() {
        let metrics = NoOpMetrics;
        metrics.record_load("cart", 2, Duration::from_millis(1));
        metrics.record_recovered("cart", "bad json");
        metrics.record_error("cart", "disk full");
    }

    #[test]
    fn test_log_metrics_defaults() {
        let metrics = LogMetrics;
        metrics.record_save("cart", Duration::from_millis(3));
        metrics.record_rejected("cart", "P1", "stock");
    }
}
