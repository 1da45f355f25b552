//! Error types for rowsieve batch construction and pipeline binding.
//!
//! Errors only arise at the boundary: building a [`crate::ColumnBatch`],
//! ingesting Arrow data, or binding a pipeline to a batch. The evaluation hot
//! path performs no validation; every invariant it relies on is established
//! here, once, before any per-row loop runs.

use thiserror::Error;

/// Result type alias using [`RowsieveError`].
pub type Result<T> = std::result::Result<T, RowsieveError>;

/// Error types for rowsieve batch construction and pipeline binding.
#[derive(Debug, Error)]
pub enum RowsieveError {
    /// Array length disagreement (column vs batch, validity vs column).
    #[error("Length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Malformed byte-string offsets (wrong length, non-monotonic, or not
    /// spanning the data buffer).
    #[error("Offsets error: {0}")]
    OffsetsError(String),

    /// A clause or projection references a column the batch does not have.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A clause or projection references a column of the wrong physical type.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    /// Arrow data that cannot be mapped onto the column store.
    #[error("Ingest error: {0}")]
    IngestError(String),
}
