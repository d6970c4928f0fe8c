//! Data stores
//!
//! A data store is the encoding-specific payload of one column, all of
//! one logical type. Three generic containers implement the encodings
//! (`PlainStore`, `RleStore`, `DictStore`); `TypedStore` dispatches an
//! element type over them, and `DataStore` erases the element type into
//! one tagged value with an arm per scalar type and an arm per grouped
//! (sequence-of-values) type. Dispatch is static within each arm.

pub mod dict;
pub mod plain;
pub mod rle;

pub use dict::{CodeStore, DictStore};
pub use plain::PlainStore;
pub use rle::{RleStore, Run};

use crate::core::error::{EngineError, Result};
use crate::core::types::{ColumnFlags, DataType, Encoding};
use crate::core::value::Value;

/// One element type across the supported encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedStore<T> {
    /// Uncompressed
    Plain(PlainStore<T>),
    /// Run-length encoded
    Rle(RleStore<T>),
    /// Dictionary encoded
    Dict(DictStore<T>),
}

impl<T: Clone + PartialEq> TypedStore<T> {
    /// Create an empty store for the given encoding. The reserved
    /// `FrameOfReference` encoding falls back to `Plain`.
    pub fn new(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Rle => TypedStore::Rle(RleStore::new()),
            Encoding::Dict => TypedStore::Dict(DictStore::new(Encoding::Plain)),
            Encoding::Plain | Encoding::FrameOfReference => TypedStore::Plain(PlainStore::new()),
        }
    }

    /// Append a value, returning its logical row index.
    pub fn push(&mut self, value: T) -> usize {
        match self {
            TypedStore::Plain(store) => store.push(value),
            TypedStore::Rle(store) => store.push(value),
            TypedStore::Dict(store) => store.push(value),
        }
    }

    /// Value at the given row, `None` when out of range.
    pub fn get(&self, row: usize) -> Option<&T> {
        match self {
            TypedStore::Plain(store) => store.get(row),
            TypedStore::Rle(store) => store.get(row),
            TypedStore::Dict(store) => store.get(row),
        }
    }

    /// Number of logical rows.
    pub fn len(&self) -> usize {
        match self {
            TypedStore::Plain(store) => store.len(),
            TypedStore::Rle(store) => store.len(),
            TypedStore::Dict(store) => store.len(),
        }
    }

    /// True when the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode into a dense vector in row order.
    pub fn decode(&self) -> Vec<T> {
        match self {
            TypedStore::Plain(store) => store.decode(),
            TypedStore::Rle(store) => store.decode(),
            TypedStore::Dict(store) => store.decode(),
        }
    }
}

/// Type-erased store for one column: three scalar arms and three
/// grouped arms, each wrapped in an encoding variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DataStore {
    /// Scalar integers
    Int(TypedStore<i64>),
    /// Scalar floats
    Float(TypedStore<f64>),
    /// Scalar text
    Text(TypedStore<String>),
    /// Grouped integers (one ordered sequence per row)
    IntGroups(TypedStore<Vec<i64>>),
    /// Grouped floats
    FloatGroups(TypedStore<Vec<f64>>),
    /// Grouped text
    TextGroups(TypedStore<Vec<String>>),
}

impl DataStore {
    /// Create an empty store for the given logical type, encoding and
    /// flags. A GROUPED flag selects the sequence arm of the same
    /// logical type.
    pub fn new(data_type: DataType, encoding: Encoding, flags: ColumnFlags) -> Self {
        let grouped = flags.contains(ColumnFlags::GROUPED);
        match (data_type, grouped) {
            (DataType::Int, false) => DataStore::Int(TypedStore::new(encoding)),
            (DataType::Float, false) => DataStore::Float(TypedStore::new(encoding)),
            (DataType::Text, false) => DataStore::Text(TypedStore::new(encoding)),
            (DataType::Int, true) => DataStore::IntGroups(TypedStore::new(encoding)),
            (DataType::Float, true) => DataStore::FloatGroups(TypedStore::new(encoding)),
            (DataType::Text, true) => DataStore::TextGroups(TypedStore::new(encoding)),
        }
    }

    /// Logical type of the stored data (the element type for grouped
    /// arms).
    pub fn data_type(&self) -> DataType {
        match self {
            DataStore::Int(_) | DataStore::IntGroups(_) => DataType::Int,
            DataStore::Float(_) | DataStore::FloatGroups(_) => DataType::Float,
            DataStore::Text(_) | DataStore::TextGroups(_) => DataType::Text,
        }
    }

    /// Flags for the stored data.
    pub fn flags(&self) -> ColumnFlags {
        match self {
            DataStore::IntGroups(_) | DataStore::FloatGroups(_) | DataStore::TextGroups(_) => {
                ColumnFlags::GROUPED
            }
            _ => ColumnFlags::empty(),
        }
    }

    /// Append a value, returning its logical row index.
    ///
    /// Fails when the declared type differs from the store's logical
    /// type, or when the value is a scalar for a grouped store, a
    /// group for an ungrouped store, or of the wrong element type.
    pub fn add_row(&mut self, declared: DataType, value: Value) -> Result<usize> {
        if declared != self.data_type() {
            return Err(EngineError::TypeMismatch(format!(
                "declared {} does not match stored {}",
                declared,
                self.data_type()
            )));
        }
        match (self, value) {
            (DataStore::Int(store), Value::Int(v)) => Ok(store.push(v)),
            (DataStore::Float(store), Value::Float(v)) => Ok(store.push(v)),
            (DataStore::Text(store), Value::Text(v)) => Ok(store.push(v)),
            (DataStore::IntGroups(store), Value::IntGroup(v)) => Ok(store.push(v)),
            (DataStore::FloatGroups(store), Value::FloatGroup(v)) => Ok(store.push(v)),
            (DataStore::TextGroups(store), Value::TextGroup(v)) => Ok(store.push(v)),
            (store, value) => Err(EngineError::TypeMismatch(format!(
                "{}{} store cannot accept {}{} value",
                if store.flags().contains(ColumnFlags::GROUPED) {
                    "grouped "
                } else {
                    ""
                },
                store.data_type(),
                if value.is_grouped() { "grouped " } else { "" },
                value.data_type()
            ))),
        }
    }

    /// Value at the given row; out-of-range reads are errors.
    pub fn get_row(&self, row: usize) -> Result<Value> {
        let value = match self {
            DataStore::Int(store) => store.get(row).copied().map(Value::Int),
            DataStore::Float(store) => store.get(row).copied().map(Value::Float),
            DataStore::Text(store) => store.get(row).cloned().map(Value::Text),
            DataStore::IntGroups(store) => store.get(row).cloned().map(Value::IntGroup),
            DataStore::FloatGroups(store) => store.get(row).cloned().map(Value::FloatGroup),
            DataStore::TextGroups(store) => store.get(row).cloned().map(Value::TextGroup),
        };
        value.ok_or(EngineError::OutOfRange {
            index: row,
            rows: self.num_rows(),
        })
    }

    /// Number of logical rows.
    pub fn num_rows(&self) -> usize {
        match self {
            DataStore::Int(store) => store.len(),
            DataStore::Float(store) => store.len(),
            DataStore::Text(store) => store.len(),
            DataStore::IntGroups(store) => store.len(),
            DataStore::FloatGroups(store) => store.len(),
            DataStore::TextGroups(store) => store.len(),
        }
    }
}
