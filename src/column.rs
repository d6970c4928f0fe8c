//! Column
//!
//! A column pairs a signature with its data store. The store sits
//! behind a shared handle: cloning a column is a cheap handle copy, and
//! appends copy-on-write, so relations produced by operators can share
//! payloads with their source while mutations never propagate.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::types::{DataType, Signature};
use crate::core::value::{HashKey, Value};
use crate::storage::DataStore;

/// A single column: signature plus payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    signature: Signature,
    data: Arc<DataStore>,
}

impl Column {
    /// Create an empty column for the signature. An unknown encoding
    /// falls back to uncompressed storage inside the store constructor.
    pub fn new(signature: Signature) -> Self {
        let data = DataStore::new(signature.data_type, signature.encoding, signature.flags);
        Self {
            signature,
            data: Arc::new(data),
        }
    }

    /// Create a column and fill it with the given values.
    pub fn with_values(
        signature: Signature,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self> {
        let data_type = signature.data_type;
        let mut column = Column::new(signature);
        for value in values {
            column.add_row(data_type, value)?;
        }
        Ok(column)
    }

    /// The column's signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Parse a text field into the column's logical type and append it.
    pub fn import_row(&mut self, field: &str) -> Result<usize> {
        let value = Value::parse(self.signature.data_type, field)?;
        self.add_row(self.signature.data_type, value)
    }

    /// Append a value under the store's type-check policy.
    pub fn add_row(&mut self, declared: DataType, value: Value) -> Result<usize> {
        Arc::make_mut(&mut self.data).add_row(declared, value)
    }

    /// Value at the given row.
    pub fn get_row(&self, row: usize) -> Result<Value> {
        self.data.get_row(row)
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.data.num_rows()
    }

    /// Freshly allocated dense copy of the column in row order,
    /// materializing run-length and dictionary payloads by full decode.
    pub fn raw_data(&self) -> RawData {
        match &*self.data {
            DataStore::Int(store) => RawData::Int(store.decode()),
            DataStore::Float(store) => RawData::Float(store.decode()),
            DataStore::Text(store) => RawData::Text(store.decode()),
            DataStore::IntGroups(store) => RawData::IntGroups(store.decode()),
            DataStore::FloatGroups(store) => RawData::FloatGroups(store.decode()),
            DataStore::TextGroups(store) => RawData::TextGroups(store.decode()),
        }
    }
}

/// Decoded column payload: a dense typed vector, with grouped columns
/// materialized as vectors of sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum RawData {
    /// Dense integers
    Int(Vec<i64>),
    /// Dense floats
    Float(Vec<f64>),
    /// Dense text
    Text(Vec<String>),
    /// Grouped integers
    IntGroups(Vec<Vec<i64>>),
    /// Grouped floats
    FloatGroups(Vec<Vec<f64>>),
    /// Grouped text
    TextGroups(Vec<Vec<String>>),
}

impl RawData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            RawData::Int(v) => v.len(),
            RawData::Float(v) => v.len(),
            RawData::Text(v) => v.len(),
            RawData::IntGroups(v) => v.len(),
            RawData::FloatGroups(v) => v.len(),
            RawData::TextGroups(v) => v.len(),
        }
    }

    /// True when the payload holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for grouped payloads.
    pub fn is_grouped(&self) -> bool {
        matches!(
            self,
            RawData::IntGroups(_) | RawData::FloatGroups(_) | RawData::TextGroups(_)
        )
    }

    /// Value at the given row, `None` when out of range.
    pub fn value(&self, row: usize) -> Option<Value> {
        match self {
            RawData::Int(v) => v.get(row).copied().map(Value::Int),
            RawData::Float(v) => v.get(row).copied().map(Value::Float),
            RawData::Text(v) => v.get(row).cloned().map(Value::Text),
            RawData::IntGroups(v) => v.get(row).cloned().map(Value::IntGroup),
            RawData::FloatGroups(v) => v.get(row).cloned().map(Value::FloatGroup),
            RawData::TextGroups(v) => v.get(row).cloned().map(Value::TextGroup),
        }
    }

    /// Order row `i` of this payload against row `j` of another.
    /// Defined for scalar payloads of the same type; floats order by
    /// `partial_cmp` with NaN treated as equal.
    pub fn cmp_rows(&self, i: usize, other: &RawData, j: usize) -> Option<Ordering> {
        match (self, other) {
            (RawData::Int(a), RawData::Int(b)) => Some(a.get(i)?.cmp(b.get(j)?)),
            (RawData::Float(a), RawData::Float(b)) => Some(
                a.get(i)?
                    .partial_cmp(b.get(j)?)
                    .unwrap_or(Ordering::Equal),
            ),
            (RawData::Text(a), RawData::Text(b)) => Some(a.get(i)?.cmp(b.get(j)?)),
            _ => None,
        }
    }

    /// Hashable key for row `i`, `None` for grouped payloads.
    pub fn hash_key(&self, row: usize) -> Option<HashKey> {
        match self {
            RawData::Int(v) => v.get(row).map(|x| HashKey::Int(*x)),
            RawData::Float(v) => v.get(row).map(|x| HashKey::Float(x.to_bits())),
            RawData::Text(v) => v.get(row).map(|x| HashKey::Text(x.clone())),
            _ => None,
        }
    }
}
