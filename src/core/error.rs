//! Engine error type
//!
//! One error enum covers the whole engine. Data-store reads and appends
//! return recoverable errors to the caller; the operator kernel aborts
//! the current operator on any fatal condition, so callers observe
//! either a valid new relation or an error, never a partial result.
//! Bulk load is the documented exception: a mid-file failure may leave
//! the relation partially populated.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A value or declared type does not match the column's logical type
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Row index past the end of a store
    #[error("row index {index} out of range ({rows} rows)")]
    OutOfRange {
        /// Requested row index
        index: usize,
        /// Rows currently stored
        rows: usize,
    },

    /// A text field could not be parsed into the column's logical type
    #[error("parse failure: {0}")]
    Parse(String),

    /// A loaded line's field count differs from the relation's column count
    #[error("schema mismatch: line has {found} fields, relation has {expected} columns")]
    SchemaMismatch {
        /// Columns in the relation
        expected: usize,
        /// Fields found on the line
        found: usize,
    },

    /// The requested operation exists in the contract but is not supported
    #[error("not supported: {0}")]
    Unsupported(String),

    /// No column with the given signature exists in the relation
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
