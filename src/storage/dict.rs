//! Dictionary encoded store
//!
//! Each distinct value is assigned a compact integer code on first
//! sight, in monotonically increasing order starting at 0. The per-row
//! code sequence lives in an inner integer store that is itself either
//! uncompressed or run-length encoded; a dictionary inside a dictionary
//! is rejected and stored uncompressed instead.

use super::plain::PlainStore;
use super::rle::RleStore;
use crate::core::types::Encoding;

/// The inner per-row code sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeStore {
    /// Codes stored as a plain vector
    Plain(PlainStore<usize>),
    /// Codes stored run-length encoded
    Rle(RleStore<usize>),
}

impl CodeStore {
    fn push(&mut self, code: usize) -> usize {
        match self {
            CodeStore::Plain(store) => store.push(code),
            CodeStore::Rle(store) => store.push(code),
        }
    }

    fn get(&self, row: usize) -> Option<usize> {
        match self {
            CodeStore::Plain(store) => store.get(row).copied(),
            CodeStore::Rle(store) => store.get(row).copied(),
        }
    }

    fn len(&self) -> usize {
        match self {
            CodeStore::Plain(store) => store.len(),
            CodeStore::Rle(store) => store.len(),
        }
    }
}

/// Dictionary encoded storage for one column's values.
///
/// Append scans the code table linearly for an existing code. The table
/// is small for the low-cardinality columns dictionary encoding is
/// meant for, and plain value equality keeps the scan correct for
/// float payloads, which have no usable hash.
#[derive(Debug, Clone, PartialEq)]
pub struct DictStore<T> {
    table: Vec<T>,
    codes: CodeStore,
}

impl<T: Clone + PartialEq> DictStore<T> {
    /// Create an empty store whose code sequence uses the given
    /// encoding. `Dict` and `FrameOfReference` degrade to `Plain`.
    pub fn new(inner: Encoding) -> Self {
        let codes = match inner {
            Encoding::Rle => CodeStore::Rle(RleStore::new()),
            _ => CodeStore::Plain(PlainStore::new()),
        };
        Self {
            table: Vec::new(),
            codes,
        }
    }

    /// Append a value, returning its logical row index.
    pub fn push(&mut self, value: T) -> usize {
        let code = match self.table.iter().position(|known| *known == value) {
            Some(code) => code,
            None => {
                self.table.push(value);
                self.table.len() - 1
            }
        };
        self.codes.push(code)
    }

    /// Value at the given row, `None` when out of range.
    pub fn get(&self, row: usize) -> Option<&T> {
        let code = self.codes.get(row)?;
        self.table.get(code)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True when the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.codes.len() == 0
    }

    /// The code-to-value table in code order.
    pub fn table(&self) -> &[T] {
        &self.table
    }

    /// Decode into a dense vector in row order.
    pub fn decode(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        match &self.codes {
            CodeStore::Plain(store) => {
                for code in store.decode() {
                    out.push(self.table[code].clone());
                }
            }
            CodeStore::Rle(store) => {
                for run in store.runs() {
                    for _ in 0..run.count {
                        out.push(self.table[run.value].clone());
                    }
                }
            }
        }
        out
    }
}
