//! Store configuration.

use crate::error::Result;
use crate::serialization::CartFormat;

/// Slot name used when none is configured.
pub const DEFAULT_SLOT: &str = "cart";

/// Which slot the store owns and how it writes it.
///
/// # Example
///
/// ```
/// use cart_kit::config::StoreConfig;
/// use cart_kit::serialization::CartFormat;
///
/// let config = StoreConfig::default()
///     .with_namespace("shop-kr")
///     .with_format(CartFormat::Envelope);
/// assert_eq!(config.slot_key(), "shop-kr:cart");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub slot: String,
    /// Prefix separating carts that share one backend.
    pub namespace: Option<String>,
    pub format: CartFormat,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            slot: DEFAULT_SLOT.to_string(),
            namespace: None,
            format: CartFormat::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_format(mut self, format: CartFormat) -> Self {
        self.format = format;
        self
    }

    /// Full key the backend is addressed with: `"{namespace}:{slot}"`.
    pub fn slot_key(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, self.slot),
            None => self.slot.clone(),
        }
    }

    /// Build from `CART_SLOT`, `CART_NAMESPACE` and `CART_FORMAT`.
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if `CART_FORMAT` names no known format.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = StoreConfig::default();
        if let Some(slot) = var("CART_SLOT") {
            config.slot = slot;
        }
        config.namespace = var("CART_NAMESPACE");
        if let Some(format) = var("CART_FORMAT") {
            config.format = format.parse()?;
        }
        Ok(config)
    }
}
