//! Error types shared across the forecast packaging crates.

use thiserror::Error;

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing the core forecast data model.
///
/// Everything here is detected at construction time, before any output
/// file is created, so a failed build never leaves a partial artifact.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A dimension unit string does not conform to the unit-expression grammar.
    #[error("malformed unit '{unit}': {reason}")]
    MalformedUnit { unit: String, reason: String },

    /// Tensor data length does not match the product of the dimension lengths.
    #[error("tensor shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A dimension was declared with no coordinate values.
    #[error("dimension '{0}' has no values")]
    EmptyDimension(String),

    /// A per-time sequence does not line up with the time axis.
    #[error("sequence '{name}' length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Time axis values must be strictly increasing.
    #[error("time axis is not strictly increasing at {0}")]
    NonMonotonicTime(chrono::NaiveDate),

    /// A required identifier field was left empty.
    #[error("identifier '{0}' must not be empty")]
    EmptyIdentifier(&'static str),
}
