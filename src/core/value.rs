//! Cell values
//!
//! `Value` is the tagged variant passed across the store boundary: one
//! arm per scalar logical type plus one arm per grouped (sequence)
//! type. Group arms are produced by group-by, where a cell holds the
//! ordered sequence of a column's values for one group.

use std::cmp::Ordering;
use std::fmt;

use super::error::{EngineError, Result};
use super::types::{Comparison, DataType};

/// A single cell value, scalar or grouped.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Scalar integer
    Int(i64),
    /// Scalar float
    Float(f64),
    /// Scalar text
    Text(String),
    /// Ordered integer sequence (grouped cell)
    IntGroup(Vec<i64>),
    /// Ordered float sequence (grouped cell)
    FloatGroup(Vec<f64>),
    /// Ordered text sequence (grouped cell)
    TextGroup(Vec<String>),
}

impl Value {
    /// Logical type of the value (the element type for group arms).
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) | Value::IntGroup(_) => DataType::Int,
            Value::Float(_) | Value::FloatGroup(_) => DataType::Float,
            Value::Text(_) | Value::TextGroup(_) => DataType::Text,
        }
    }

    /// True for the group arms.
    pub fn is_grouped(&self) -> bool {
        matches!(
            self,
            Value::IntGroup(_) | Value::FloatGroup(_) | Value::TextGroup(_)
        )
    }

    /// Length of a group value, `None` for scalars.
    pub fn group_len(&self) -> Option<usize> {
        match self {
            Value::IntGroup(v) => Some(v.len()),
            Value::FloatGroup(v) => Some(v.len()),
            Value::TextGroup(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Parse a text field into a scalar value of the given type.
    ///
    /// Integers are decimal with an optional sign, floats are
    /// double-precision, text keeps the raw field.
    pub fn parse(data_type: DataType, field: &str) -> Result<Value> {
        match data_type {
            DataType::Int => field
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| EngineError::Parse(format!("{:?} as int: {}", field, e))),
            DataType::Float => field
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| EngineError::Parse(format!("{:?} as float: {}", field, e))),
            DataType::Text => Ok(Value::Text(field.to_string())),
        }
    }

    /// Evaluate `self <comp> other`.
    ///
    /// Defined only for two scalars of the same logical type; any other
    /// combination (grouped operand, differing types) has no comparator
    /// implementation and yields `None`. Integers and floats compare
    /// numerically (floats with IEEE semantics), text compares
    /// codepoint-wise lexicographically.
    pub fn compare(&self, comp: Comparison, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(match comp {
                Comparison::Eq => a == b,
                Comparison::Neq => a != b,
                Comparison::Lt => a < b,
                Comparison::Leq => a <= b,
                Comparison::Gt => a > b,
                Comparison::Geq => a >= b,
            }),
            (Value::Float(a), Value::Float(b)) => Some(match comp {
                Comparison::Eq => a == b,
                Comparison::Neq => a != b,
                Comparison::Lt => a < b,
                Comparison::Leq => a <= b,
                Comparison::Gt => a > b,
                Comparison::Geq => a >= b,
            }),
            (Value::Text(a), Value::Text(b)) => Some(match comp {
                Comparison::Eq => a == b,
                Comparison::Neq => a != b,
                Comparison::Lt => a < b,
                Comparison::Leq => a <= b,
                Comparison::Gt => a > b,
                Comparison::Geq => a >= b,
            }),
            _ => None,
        }
    }

    /// Total ordering between two scalars of the same type, `None`
    /// otherwise. Floats order by `partial_cmp` with NaN treated as
    /// equal to everything, which keeps sorting total.
    pub fn cmp_scalar(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => {
                Some(a.partial_cmp(b).unwrap_or(Ordering::Equal))
            }
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Hashable key for a scalar value, `None` for group arms. Floats
    /// key by bit pattern.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(v) => Some(HashKey::Int(*v)),
            Value::Float(v) => Some(HashKey::Float(v.to_bits())),
            Value::Text(v) => Some(HashKey::Text(v.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, "]")
        }
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::IntGroup(v) => join(f, v),
            Value::FloatGroup(v) => join(f, v),
            Value::TextGroup(v) => join(f, v),
        }
    }
}

/// Hashable stand-in for a scalar `Value`, used to key hash maps in
/// group-by and hash join (f64 is not `Hash`; the bit pattern is).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// Integer key
    Int(i64),
    /// Float key by bit pattern
    Float(u64),
    /// Text key
    Text(String),
}
