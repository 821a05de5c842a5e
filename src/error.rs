//! Error types for the bitspan engine.
//!
//! This module provides a unified error type for all operations in the
//! engine, using the `thiserror` crate for ergonomic error handling.
//!
//! Negative search results (no qualifying bit or run) are not errors; search
//! operations report them as `Ok(None)`.

use thiserror::Error;

/// The main error type for bitspan operations.
#[derive(Error, Debug)]
pub enum BitSpanError {
    /// A required argument is missing, ambiguous, or out of its valid range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Bit index beyond the logical length of the span
    #[error("index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds {
        /// The index that was accessed
        index: usize,
        /// The valid length
        length: usize,
    },

    /// Handle invariants violated at entry; a prior operation or external
    /// mutation left the handle inconsistent. Reported, never repaired.
    #[error("corrupted span state: {0}")]
    CorruptedState(String),

    /// Operation-specific refusal that leaves all operands untouched
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

/// A specialized `Result` type for bitspan operations.
pub type Result<T> = std::result::Result<T, BitSpanError>;
