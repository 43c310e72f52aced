//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// A full history rejecting an insertion is not an error; see
/// [`Insertion::Rejected`](crate::Insertion::Rejected).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// A position outside of the active range `[0, size)`.
    #[error("Index {index} is out of range for {size} active entries")]
    IndexOutOfRange {
        /// The offending position or slot id.
        index: usize,

        /// Upper bound (exclusive) of valid indices.
        size: usize,
    },

    /// Invalid capacity, schema or sample size.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// NaN or infinite priority.
    #[error("Priority must be finite, got {0}")]
    NonFiniteWeight(f32),

    /// Batch update with different numbers of positions and weights.
    #[error("Got {positions} positions but {weights} weights")]
    LengthMismatch {
        /// Number of positions.
        positions: usize,

        /// Number of weights.
        weights: usize,
    },

    /// Payload not matching the storage schema.
    #[error("Payload does not match the storage schema: {0}")]
    SchemaMismatch(String),

    /// Snapshot violating the invariants of the index.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// The lock of a shared history was poisoned by a panicking thread.
    #[error("Lock of the shared history was poisoned")]
    Poisoned,
}

/// Result type of fallible operations on the history.
pub type Result<T> = std::result::Result<T, HistoryError>;
