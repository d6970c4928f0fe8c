//! Core enumerations and the column signature
//!
//! These types form the public vocabulary of the engine: logical data
//! types, column encodings, comparison operators, join and aggregation
//! kinds, sort orders, and the `Signature` that identifies a column
//! inside a relation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer
    Int,
    /// Double-precision floating point
    Float,
    /// UTF-8 text
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Text => write!(f, "text"),
        }
    }
}

/// Column encoding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// No encoding; values are stored as a contiguous vector
    Plain,
    /// Run-length encoding: (count, value) runs
    Rle,
    /// Dictionary encoding: integer codes into a value table
    Dict,
    /// Frame-of-reference encoding. Reserved; constructors fall back to
    /// `Plain` until it is implemented.
    FrameOfReference,
}

/// Comparison operator used by select predicates, sorting and joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Equality
    Eq,
    /// Inequality
    Neq,
    /// Strictly less than
    Lt,
    /// Less than or equal
    Leq,
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Geq,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparison::Eq => "==",
            Comparison::Neq => "!=",
            Comparison::Lt => "<",
            Comparison::Leq => "<=",
            Comparison::Gt => ">",
            Comparison::Geq => ">=",
        };
        write!(f, "{}", symbol)
    }
}

/// Kind of join produced by the join operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    /// Inner join: matched pairs from both sides
    Inner,
    /// Semi join: the reduction of the left relation
    Semi,
    /// Left outer join. Requires NULL support; currently signalled as
    /// unsupported.
    LeftOuter,
    /// Right outer join. Requires NULL support; currently signalled as
    /// unsupported.
    RightOuter,
}

/// Predefined aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggrFunc {
    /// Number of elements in the group
    Count,
    /// Sum of the group values (numeric types only)
    Sum,
    /// Lowest group value
    Min,
    /// Highest group value
    Max,
}

/// Sorting direction for `merge_sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order
    Ascending,
    /// Descending order
    Descending,
}

bitflags! {
    /// Flags refining a column's storage semantics.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColumnFlags: u8 {
        /// Each cell holds an ordered sequence of values instead of a
        /// scalar. Produced by group-by.
        const GROUPED = 0b0000_0001;
        /// Reserved for NULL support; currently unused.
        const NULLABLE = 0b0000_0010;
    }
}

/// Identity of a column inside a relation: name, logical type, encoding
/// and flags. Columns are addressed by full signature equality, so a
/// relation must not contain two columns with identical signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Column name
    pub name: String,
    /// Logical data type
    pub data_type: DataType,
    /// Storage encoding
    pub encoding: Encoding,
    /// Storage flags
    pub flags: ColumnFlags,
}

impl Signature {
    /// Create an unflagged signature.
    pub fn new(name: impl Into<String>, data_type: DataType, encoding: Encoding) -> Self {
        Self {
            name: name.into(),
            data_type,
            encoding,
            flags: ColumnFlags::empty(),
        }
    }

    /// Same signature with the given flags.
    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Same signature with the GROUPED flag set.
    pub fn grouped(mut self) -> Self {
        self.flags |= ColumnFlags::GROUPED;
        self
    }

    /// True when the GROUPED flag is set.
    pub fn is_grouped(&self) -> bool {
        self.flags.contains(ColumnFlags::GROUPED)
    }

    /// Same signature renamed, everything else preserved.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: self.data_type,
            encoding: self.encoding,
            flags: self.flags,
        }
    }

    /// True when name, type and encoding match, ignoring flags. Used by
    /// aggregate so callers can address a grouped column by the
    /// signature it had before group-by.
    pub fn matches_ignoring_flags(&self, other: &Signature) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.encoding == other.encoding
    }
}
