//! Column Store - In-memory column-oriented relational engine
//!
//! This crate organizes tabular data as named relations of typed,
//! possibly-encoded columns and exposes a small relational algebra over
//! them: scan (projection), selection, merge sort, hash join, merge
//! join, group-by, aggregation and bulk load from delimited text.
//! Operator composition yields new relations that can be further
//! queried or printed.

pub mod catalog;
pub mod column;
pub mod core;
pub mod reader;
pub mod relation;
pub mod storage;
mod tests;

// Re-export commonly used types
pub use catalog::{Catalog, SharedRelation};
pub use column::{Column, RawData};
pub use core::error::{EngineError, Result};
pub use core::types::{
    AggrFunc, ColumnFlags, Comparison, DataType, Encoding, JoinType, Signature, SortOrder,
};
pub use core::value::Value;
pub use reader::LineReader;
pub use relation::Relation;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
