//! Core abstractions shared by the whole engine: the public
//! enumerations, the column signature, cell values and the error type.

pub mod error;
pub mod types;
pub mod value;

pub use error::{EngineError, Result};
pub use types::{
    AggrFunc, ColumnFlags, Comparison, DataType, Encoding, JoinType, Signature, SortOrder,
};
pub use value::{HashKey, Value};
