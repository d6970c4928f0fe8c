//! Group-by and aggregation
//!
//! Group-by partitions rows by the distinct values of one column. The
//! group column keeps its scalar type; every other column becomes a
//! GROUPED column whose cell is the ordered sequence of that column's
//! values for the group (source row order). Aggregate then reduces one
//! grouped column back to a scalar, leaving the group key and any other
//! grouped columns untouched.

use std::collections::HashMap;

use crate::column::{Column, RawData};
use crate::core::error::{EngineError, Result};
use crate::core::types::{AggrFunc, ColumnFlags, DataType, Signature};
use crate::core::value::{HashKey, Value};

use super::Relation;

impl Relation {
    /// Partition rows by the distinct values of the indicated column.
    ///
    /// One output row per distinct key. Callers must not rely on the
    /// group order (currently first-seen); within a group, values keep
    /// source row order. Fails when the relation already has a grouped
    /// column or the key column is absent.
    pub fn group_by(&self, key: &Signature) -> Result<Relation> {
        if self.columns.iter().any(|c| c.signature().is_grouped()) {
            return Err(EngineError::Unsupported(
                "relation is already grouped".to_string(),
            ));
        }
        let key_pos = self
            .columns
            .iter()
            .position(|c| c.signature() == key)
            .ok_or_else(|| EngineError::ColumnNotFound(key.name.clone()))?;

        let key_data = self.columns[key_pos].raw_data();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut seen: HashMap<HashKey, usize> = HashMap::new();
        for row in 0..self.num_rows() {
            if let Some(hash_key) = key_data.hash_key(row) {
                match seen.get(&hash_key) {
                    Some(&group) => groups[group].push(row),
                    None => {
                        seen.insert(hash_key, groups.len());
                        groups.push(vec![row]);
                    }
                }
            }
        }

        let mut columns = Vec::with_capacity(self.columns.len());
        for (pos, source) in self.columns.iter().enumerate() {
            if pos == key_pos {
                let data_type = source.signature().data_type;
                let mut column = Column::new(source.signature().clone());
                for group in &groups {
                    column.add_row(data_type, source.get_row(group[0])?)?;
                }
                columns.push(column);
            } else {
                columns.push(gather_groups(source, &groups)?);
            }
        }
        Ok(Relation::from_columns(
            format!("{}(grouped)", self.name),
            columns,
        ))
    }

    /// Reduce one grouped column to a scalar, per group.
    ///
    /// The target is located by name, type and encoding so the
    /// signature from before group-by still addresses it; it must be
    /// grouped. COUNT promotes the result column to integer. All other
    /// columns, including other grouped columns, are copied through
    /// unchanged.
    pub fn aggregate(&self, target: &Signature, func: AggrFunc) -> Result<Relation> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.signature().matches_ignoring_flags(target))
            .ok_or_else(|| EngineError::ColumnNotFound(target.name.clone()))?;
        let source = &self.columns[pos];
        if !source.signature().is_grouped() {
            return Err(EngineError::Unsupported(format!(
                "aggregate target {} is not a grouped column",
                target.name
            )));
        }

        let mut signature = source.signature().clone();
        signature.flags.remove(ColumnFlags::GROUPED);
        if func == AggrFunc::Count {
            signature.data_type = DataType::Int;
        }
        let data_type = signature.data_type;

        let mut reduced = Column::new(signature);
        for row in 0..source.num_rows() {
            reduced.add_row(data_type, reduce(source.get_row(row)?, func)?)?;
        }

        let mut columns = self.columns.clone();
        columns[pos] = reduced;
        Ok(Relation::from_columns(self.name.clone(), columns))
    }
}

/// Build the GROUPED counterpart of `source` holding one sequence per
/// group, in source row order.
fn gather_groups(source: &Column, groups: &[Vec<usize>]) -> Result<Column> {
    let data = source.raw_data();
    let data_type = source.signature().data_type;
    let mut column = Column::new(source.signature().clone().grouped());
    for group in groups {
        let value = match &data {
            RawData::Int(v) => Value::IntGroup(group.iter().map(|&r| v[r]).collect()),
            RawData::Float(v) => Value::FloatGroup(group.iter().map(|&r| v[r]).collect()),
            RawData::Text(v) => {
                Value::TextGroup(group.iter().map(|&r| v[r].clone()).collect())
            }
            _ => {
                return Err(EngineError::TypeMismatch(format!(
                    "column {} is already grouped",
                    source.signature().name
                )))
            }
        };
        column.add_row(data_type, value)?;
    }
    Ok(column)
}

/// Reduce one group sequence to a scalar.
fn reduce(value: Value, func: AggrFunc) -> Result<Value> {
    let empty = || EngineError::Unsupported("cannot reduce an empty group".to_string());
    match (func, value) {
        (AggrFunc::Count, value) => value
            .group_len()
            .map(|len| Value::Int(len as i64))
            .ok_or_else(|| EngineError::TypeMismatch("COUNT needs a grouped cell".to_string())),
        (AggrFunc::Sum, Value::IntGroup(v)) => Ok(Value::Int(v.iter().sum())),
        (AggrFunc::Sum, Value::FloatGroup(v)) => Ok(Value::Float(v.iter().sum())),
        (AggrFunc::Sum, Value::TextGroup(_)) => Err(EngineError::Unsupported(
            "SUM over a text column".to_string(),
        )),
        (AggrFunc::Min, Value::IntGroup(v)) => {
            v.iter().min().copied().map(Value::Int).ok_or_else(empty)
        }
        (AggrFunc::Max, Value::IntGroup(v)) => {
            v.iter().max().copied().map(Value::Int).ok_or_else(empty)
        }
        (AggrFunc::Min, Value::FloatGroup(v)) => v
            .iter()
            .copied()
            .reduce(f64::min)
            .map(Value::Float)
            .ok_or_else(empty),
        (AggrFunc::Max, Value::FloatGroup(v)) => v
            .iter()
            .copied()
            .reduce(f64::max)
            .map(Value::Float)
            .ok_or_else(empty),
        (AggrFunc::Min, Value::TextGroup(v)) => {
            v.into_iter().min().map(Value::Text).ok_or_else(empty)
        }
        (AggrFunc::Max, Value::TextGroup(v)) => {
            v.into_iter().max().map(Value::Text).ok_or_else(empty)
        }
        (func, _) => Err(EngineError::TypeMismatch(format!(
            "{:?} needs a grouped cell",
            func
        ))),
    }
}
