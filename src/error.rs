//! Error types for the tabular-rl crate.

use thiserror::Error;

/// Result type alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, RlError>;

#[derive(Error, Debug)]
pub enum RlError {
    /// Invalid configuration value, rejected at construction.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Mismatch in the dimensions of input data.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// An operation that needs at least one element got none.
    #[error("empty collection: {message}")]
    EmptyCollection { message: String },

    /// Policy evaluation hit its sweep bound before the value change
    /// dropped below the threshold.
    #[error("policy evaluation did not converge after {sweeps} sweeps (delta = {delta})")]
    DidNotConverge { sweeps: usize, delta: f64 },
}
