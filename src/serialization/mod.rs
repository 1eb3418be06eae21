//! Persisted cart layout.
//!
//! Two formats share one slot:
//!
//! - **Json** (default): the legacy layout, a JSON array of line objects
//!   `{product_id, product_name, product_code, base_price, image_url?, quantity, stock}`.
//!   No version field.
//! - **Envelope**: Postcard payload wrapped in a versioned envelope.
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│ VERSION (u32)   │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "CART"                                 Vec<EnvelopeLine>
//! ```
//!
//! [`decode_cart`] detects the format from the first bytes, so a slot
//! written in the legacy layout stays readable after switching to the
//! envelope, and the next write migrates it.
//!
//! # Example
//!
//! ```rust
//! use cart_kit::cart::{Cart, CartItem};
//! use cart_kit::serialization::{decode_cart, encode_cart, CartFormat};
//!
//! # fn main() -> cart_kit::Result<()> {
//! let mut cart = Cart::new();
//! cart.merge(CartItem::new("P1", 1200, 5), 2)?;
//!
//! let bytes = encode_cart(&cart, CartFormat::Envelope)?;
//! assert_eq!(&bytes[0..4], b"CART");
//! assert_eq!(decode_cart(&bytes)?, cart);
//! # Ok(())
//! # }
//! ```

use crate::cart::{Cart, CartLine};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Magic header for enveloped carts: b"CART"
pub const CART_MAGIC: [u8; 4] = *b"CART";

/// Current envelope schema version.
///
/// **CRITICAL:** Increment when `CartLine` changes shape. Older envelopes are
/// then treated as unreadable and the slot starts over empty.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Encoding used when writing the slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CartFormat {
    /// Legacy JSON array, readable by the storefront pages.
    #[default]
    Json,
    /// Versioned Postcard envelope.
    Envelope,
}

impl FromStr for CartFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(CartFormat::Json),
            "envelope" | "postcard" => Ok(CartFormat::Envelope),
            other => Err(Error::ConfigError(format!("unknown cart format: {}", other))),
        }
    }
}

/// Line as stored inside the envelope.
///
/// Postcard is not self-describing, so every field is always written; the
/// JSON layout's optional `image_url` rule does not apply here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EnvelopeLine {
    pub product_id: String,
    pub product_name: String,
    pub product_code: String,
    pub unit_price: u64,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub stock_ceiling: u32,
}

impl From<&CartLine> for EnvelopeLine {
    fn from(line: &CartLine) -> Self {
        EnvelopeLine {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            product_code: line.product_code.clone(),
            unit_price: line.unit_price,
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            stock_ceiling: line.stock_ceiling,
        }
    }
}

impl From<EnvelopeLine> for CartLine {
    fn from(line: EnvelopeLine) -> Self {
        CartLine {
            product_id: line.product_id,
            product_name: line.product_name,
            product_code: line.product_code,
            unit_price: line.unit_price,
            image_url: line.image_url,
            quantity: line.quantity,
            stock_ceiling: line.stock_ceiling,
        }
    }
}

/// Versioned envelope for persisted carts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartEnvelope<T> {
    /// Magic header: must be b"CART"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    pub payload: T,
}

impl<T> CartEnvelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            magic: CART_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Encode a cart for the slot.
///
/// # Errors
///
/// Returns `Error::SerializationError` if encoding fails.
pub fn encode_cart(cart: &Cart, format: CartFormat) -> Result<Vec<u8>> {
    match format {
        CartFormat::Json => serde_json::to_vec(cart.lines()).map_err(|e| {
            log::error!("Cart JSON serialization failed: {}", e);
            Error::SerializationError(e.to_string())
        }),
        CartFormat::Envelope => {
            let lines: Vec<EnvelopeLine> = cart.lines().iter().map(EnvelopeLine::from).collect();
            let envelope = CartEnvelope::new(lines);
            postcard::to_allocvec(&envelope).map_err(|e| {
                log::error!("Cart envelope serialization failed: {}", e);
                Error::SerializationError(e.to_string())
            })
        }
    }
}

/// Detect the format a blob was written in.
pub fn detect_format(bytes: &[u8]) -> CartFormat {
    if bytes.starts_with(&CART_MAGIC) {
        CartFormat::Envelope
    } else {
        CartFormat::Json
    }
}

/// Decode a slot blob into a cart, validating every invariant.
///
/// An empty blob decodes to an empty cart.
///
/// # Errors
///
/// - `Error::DeserializationError`: malformed JSON/Postcard, or lines that
///   break a cart invariant
/// - `Error::InvalidCartEntry`: envelope header unreadable
/// - `Error::VersionMismatch`: envelope written by another schema version
pub fn decode_cart(bytes: &[u8]) -> Result<Cart> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Cart::new());
    }

    let lines = match detect_format(bytes) {
        CartFormat::Json => decode_legacy(bytes)?,
        CartFormat::Envelope => decode_envelope(bytes)?,
    };
    Cart::from_lines(lines)
}

fn decode_legacy(bytes: &[u8]) -> Result<Vec<CartLine>> {
    // `null` is what the pages leave behind after clearing the array
    let lines: Option<Vec<CartLine>> = serde_json::from_slice(bytes).map_err(|e| {
        log::warn!("Cart JSON deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;
    Ok(lines.unwrap_or_default())
}

fn decode_envelope(bytes: &[u8]) -> Result<Vec<CartLine>> {
    #[derive(Deserialize)]
    struct Header {
        magic: [u8; 4],
        version: u32,
    }

    // Header first so a version bump reports VersionMismatch rather than a
    // payload decode error
    let (header, _) = postcard::take_from_bytes::<Header>(bytes).map_err(|e| {
        log::warn!("Cart envelope header unreadable: {}", e);
        Error::InvalidCartEntry(e.to_string())
    })?;

    if header.magic != CART_MAGIC {
        return Err(Error::InvalidCartEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CART_MAGIC, header.magic
        )));
    }

    if header.version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Cart version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            header.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: header.version,
        });
    }

    let envelope: CartEnvelope<Vec<EnvelopeLine>> = postcard::from_bytes(bytes).map_err(|e| {
        log::warn!("Cart envelope deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;
    Ok(envelope.payload.into_iter().map(CartLine::from).collect())
}
