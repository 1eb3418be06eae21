//! Cart data model and merge rules.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s, unique by `product_id`.
//! Every line holds `1 <= quantity <= stock_ceiling`. The merge logic here
//! is pure; persistence lives in [`crate::store`].

use crate::error::{Error, Result};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One product's presence in the cart.
///
/// Field names follow the persisted layout: `unit_price` is stored as
/// `base_price` and `stock_ceiling` as `stock`.
///
/// `unit_price` is a whole number of currency units. Reading accepts
/// `12000` and `12000.0`; a negative or fractional `base_price` makes the
/// whole blob undecodable, and the slot then reads as an empty cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub product_name: String,
    pub product_code: String,
    #[serde(rename = "base_price", deserialize_with = "deserialize_price")]
    pub unit_price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
    #[serde(rename = "stock")]
    pub stock_ceiling: u32,
}

fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct PriceVisitor;

    impl<'de> Visitor<'de> for PriceVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a non-negative whole price")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u64, E> {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
                Ok(v as u64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(PriceVisitor)
}

impl CartLine {
    /// Line total in the same unit as `unit_price`.
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// The product snapshot a caller hands to `add_item`.
///
/// `stock_ceiling` is the available stock at the time of the call. It bounds
/// the line's cumulative quantity and becomes the line's stored ceiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: String,
    pub product_name: String,
    pub product_code: String,
    pub unit_price: u64,
    pub image_url: Option<String>,
    pub stock_ceiling: u32,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, unit_price: u64, stock_ceiling: u32) -> Self {
        CartItem {
            product_id: product_id.into(),
            product_name: String::new(),
            product_code: String::new(),
            unit_price,
            image_url: None,
            stock_ceiling,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = code.into();
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    fn into_line(self, quantity: u32) -> CartLine {
        CartLine {
            product_id: self.product_id,
            product_name: self.product_name,
            product_code: self.product_code,
            unit_price: self.unit_price,
            image_url: self.image_url,
            quantity,
            stock_ceiling: self.stock_ceiling,
        }
    }
}

/// What a successful merge did to the cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new line was appended with the requested quantity.
    Added { quantity: u32 },
    /// A new line was appended, clamped down to the stock ceiling.
    Clamped { requested: u32, quantity: u32 },
    /// An existing line's quantity was raised.
    Merged { quantity: u32 },
}

impl MergeOutcome {
    /// Quantity the touched line holds after the merge.
    pub fn quantity(&self) -> u32 {
        match self {
            MergeOutcome::Added { quantity }
            | MergeOutcome::Clamped { quantity, .. }
            | MergeOutcome::Merged { quantity } => *quantity,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from decoded lines, checking every invariant.
    ///
    /// # Errors
    ///
    /// `Error::DeserializationError` on a duplicate `product_id` or a
    /// quantity outside `1..=stock_ceiling`.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if !seen.insert(line.product_id.as_str()) {
                return Err(Error::DeserializationError(format!(
                    "duplicate product_id {}",
                    line.product_id
                )));
            }
            if line.quantity == 0 || line.quantity > line.stock_ceiling {
                return Err(Error::DeserializationError(format!(
                    "quantity {} out of range 1..={} for {}",
                    line.quantity, line.stock_ceiling, line.product_id
                )));
            }
        }
        Ok(Cart { lines })
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Sum of quantities across all lines (not the number of lines).
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of line subtotals.
    pub fn total_price(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.subtotal()))
    }

    /// Merge `quantity` units of `item` into the cart.
    ///
    /// - Existing line: the cumulative quantity must stay within the item's
    ///   stock ceiling, otherwise the cart is left untouched. The quantity and
    ///   the ceiling snapshot are updated; name, code, price and image keep
    ///   their old values.
    /// - New line: the quantity is clamped to the stock ceiling.
    ///
    /// # Errors
    ///
    /// - `Error::ValidationError`: `quantity` is zero
    /// - `Error::StockExceeded`: merge past the ceiling, or a new line whose
    ///   ceiling is zero
    pub fn merge(&mut self, item: CartItem, quantity: u32) -> Result<MergeOutcome> {
        if quantity == 0 {
            return Err(Error::ValidationError(format!(
                "quantity for {} must be at least 1",
                item.product_id
            )));
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == item.product_id)
        {
            let requested = u64::from(line.quantity) + u64::from(quantity);
            if requested > u64::from(item.stock_ceiling) {
                return Err(Error::StockExceeded {
                    product_id: item.product_id,
                    requested,
                    max: item.stock_ceiling,
                });
            }
            // requested <= stock_ceiling, so it fits in u32
            line.quantity = requested as u32;
            line.stock_ceiling = item.stock_ceiling;
            return Ok(MergeOutcome::Merged {
                quantity: line.quantity,
            });
        }

        if item.stock_ceiling == 0 {
            return Err(Error::StockExceeded {
                product_id: item.product_id,
                requested: u64::from(quantity),
                max: 0,
            });
        }

        let clamped = quantity.min(item.stock_ceiling);
        self.lines.push(item.into_line(clamped));

        if clamped < quantity {
            Ok(MergeOutcome::Clamped {
                requested: quantity,
                quantity: clamped,
            })
        } else {
            Ok(MergeOutcome::Added { quantity: clamped })
        }
    }
}
