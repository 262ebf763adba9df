//! Errors raised by the truncation engine.

use thiserror::Error;

/// Truncation failure: bad limit parameters or a tokenizer that cannot round-trip.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TruncationError {
    /// A price, budget or count was negative or not a number.
    #[error("invalid truncation parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    /// The tokenizer could not be built or failed to decode.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}
