//! Error types shared by every codec in the crate.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by compression, decompression and the file helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// A codec parameter is outside the range its container format can carry.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The compressed container is truncated or structurally invalid.
    #[error("decode error: {0}")]
    Decode(String),

    /// Input exceeds a fixed-width field of the container format.
    #[error("input too large: {length} exceeds maximum of {max_length}")]
    InputTooLarge { length: usize, max_length: usize },

    /// Decompressed output differs from the original input.
    #[error("round trip mismatch: expected {expected} bytes, got {actual} bytes")]
    RoundTripMismatch { expected: usize, actual: usize },

    /// I/O error from reading or writing whole files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode(message.into())
    }

    /// Create a decode error with a bit offset for context.
    pub fn decode_at(message: impl Into<String>, bit_offset: usize) -> Self {
        Error::Decode(format!("{} at bit {}", message.into(), bit_offset))
    }
}
