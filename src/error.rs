//! Error types for the cart store.

use std::fmt;

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cart-kit.
///
/// Store-level operations never hand these to callers directly: `get_items`
/// and `get_item_count` fail soft, and `add_item` reports through its boolean
/// return plus a [`Notice`](crate::notify::Notice). The typed variants surface
/// through `try_add_item`, the backends and the serialization layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Encoding the cart into its persisted representation failed.
    SerializationError(String),

    /// The persisted blob could not be decoded into a cart.
    ///
    /// Common causes:
    /// - Slot overwritten by something that is not a cart
    /// - Truncated write
    /// - A legacy blob that violates a cart invariant (duplicate product,
    ///   quantity outside `1..=stock`)
    ///
    /// **Recovery:** the store treats the slot as empty.
    DeserializationError(String),

    /// The caller passed an argument no cart line can represent.
    ValidationError(String),

    /// Adding `requested` units would take a line past its stock ceiling.
    ///
    /// `requested` is the cumulative quantity the line would have held.
    StockExceeded {
        product_id: String,
        requested: u64,
        max: u32,
    },

    /// Backend storage error (file system, Redis, ...).
    ///
    /// This is the persistence failure of the store: the slot could not be
    /// read or written.
    BackendError(String),

    /// Invalid envelope: the blob carries the cart magic but a broken header.
    InvalidCartEntry(String),

    /// Envelope schema version differs from the compiled one.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from persisted entry)
        found: u32,
    },

    /// Configuration error (bad env value, unusable directory, ...).
    ConfigError(String),

    /// Feature not implemented or not enabled.
    NotImplemented(String),

    /// A remote document could not be fetched or was not usable.
    RemoteError(String),

    /// Generic error with custom message.
    Other(String),
}

impl Error {
    /// Whether this error means the slot could not be read or written.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Error::BackendError(_) | Error::SerializationError(_))
    }

    /// Whether this error comes from decoding a persisted blob.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Error::DeserializationError(_)
                | Error::InvalidCartEntry(_)
                | Error::VersionMismatch { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::StockExceeded {
                product_id,
                requested,
                max,
            } => write!(
                f,
                "Stock exceeded for {}: requested {}, maximum {}",
                product_id, requested, max
            ),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidCartEntry(msg) => write!(f, "Invalid cart entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cart version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::RemoteError(msg) => write!(f, "Remote error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::BackendError(format!("Redis error: {}", e))
    }
}

#[cfg(feature = "api-docs")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::RemoteError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ValidationError("Test".to_string());
        assert_eq!(err.to_string(), "Validation error: Test");
    }

    #[test]
    fn test_stock_exceeded_display_names_maximum() {
        let err = Error::StockExceeded {
            product_id: "P1".to_string(),
            requested: 7,
            max: 5,
        };
        assert_eq!(
            err.to_string(),
            "Stock exceeded for P1: requested 7, maximum 5"
        );
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_json_syntax_error_is_decode_failure() {
        let err: Error = serde_json::from_str::<Vec<u32>>("[1, 2")
            .unwrap_err()
            .into();
        assert!(err.is_decode_failure());
        assert!(!err.is_persistence_failure());
    }

    #[test]
    fn test_io_error_is_persistence_failure() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(err.is_persistence_failure());
    }
}
