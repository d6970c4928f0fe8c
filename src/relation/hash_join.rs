//! Hash join
//!
//! Classic build/probe equi-join. The smaller relation by row count is
//! loaded into one hash map per join key column (value to ordered row
//! index list); the larger relation probes, intersecting the per-column
//! lists row by row. Output order is probe-driven: all matches for
//! probe row 0 precede those for probe row 1, and within one probe row
//! the build rows appear in build order.

use std::collections::HashMap;

use crate::column::RawData;
use crate::core::error::{EngineError, Result};
use crate::core::types::{Comparison, JoinType, Signature};
use crate::core::value::HashKey;

use super::Relation;

impl Relation {
    /// Join this relation (left) with `right` by hashing.
    ///
    /// Only `Comparison::Eq` is accepted. The key lists must have equal
    /// length and pairwise matching logical types; grouped key columns
    /// are rejected. `Inner` emits matched pairs with the output schema
    /// `<left>.<col>` columns followed by `<right>.<col>` columns;
    /// `Semi` builds on the right and emits each matching left row
    /// exactly once with a left-only schema. Outer joins require NULL
    /// support and fail.
    pub fn hash_join(
        &self,
        left_keys: &[Signature],
        right: &Relation,
        right_keys: &[Signature],
        join: JoinType,
        comp: Comparison,
    ) -> Result<Relation> {
        if comp != Comparison::Eq {
            return Err(EngineError::Unsupported(format!(
                "hash join requires an equality comparison, got {}",
                comp
            )));
        }
        check_join_keys(self, left_keys, right, right_keys)?;

        match join {
            JoinType::LeftOuter | JoinType::RightOuter => Err(EngineError::Unsupported(
                "outer joins require NULL support".to_string(),
            )),
            JoinType::Semi => self.hash_semi_join(left_keys, right, right_keys),
            JoinType::Inner => self.hash_inner_join(left_keys, right, right_keys),
        }
    }

    fn hash_inner_join(
        &self,
        left_keys: &[Signature],
        right: &Relation,
        right_keys: &[Signature],
    ) -> Result<Relation> {
        // the smaller side builds, the other probes
        let build_is_left = self.num_rows() <= right.num_rows();
        let (build, build_keys, probe, probe_keys) = if build_is_left {
            (self, left_keys, right, right_keys)
        } else {
            (right, right_keys, self, left_keys)
        };

        let maps = build_key_maps(build, build_keys)?;
        let probe_data = decode_keys(probe, probe_keys)?;

        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        for probe_row in 0..probe.num_rows() {
            for build_row in intersect_matches(&maps, &probe_data, probe_row) {
                if build_is_left {
                    left_rows.push(build_row);
                    right_rows.push(probe_row);
                } else {
                    left_rows.push(probe_row);
                    right_rows.push(build_row);
                }
            }
        }

        let mut columns = self.take_columns(&left_rows, Some(&self.name))?;
        columns.extend(right.take_columns(&right_rows, Some(&right.name))?);
        Ok(Relation::from_columns(
            format!("{} x {}", self.name, right.name),
            columns,
        ))
    }

    fn hash_semi_join(
        &self,
        left_keys: &[Signature],
        right: &Relation,
        right_keys: &[Signature],
    ) -> Result<Relation> {
        let maps = build_key_maps(right, right_keys)?;
        let left_data = decode_keys(self, left_keys)?;

        let mut kept = Vec::new();
        for row in 0..self.num_rows() {
            if !intersect_matches(&maps, &left_data, row).is_empty() {
                kept.push(row);
            }
        }

        let columns = self.take_columns(&kept, Some(&self.name))?;
        Ok(Relation::from_columns(
            format!("{} (x {})", self.name, right.name),
            columns,
        ))
    }
}

/// Shared join-key validation: equal-length key lists, every key
/// present, scalar, with pairwise matching logical types.
pub(super) fn check_join_keys(
    left: &Relation,
    left_keys: &[Signature],
    right: &Relation,
    right_keys: &[Signature],
) -> Result<()> {
    if left_keys.is_empty() || left_keys.len() != right_keys.len() {
        return Err(EngineError::Unsupported(format!(
            "join requires matching key lists, got {} and {}",
            left_keys.len(),
            right_keys.len()
        )));
    }
    for (lsig, rsig) in left_keys.iter().zip(right_keys) {
        left.column(lsig)
            .ok_or_else(|| EngineError::ColumnNotFound(lsig.name.clone()))?;
        right
            .column(rsig)
            .ok_or_else(|| EngineError::ColumnNotFound(rsig.name.clone()))?;
        if lsig.is_grouped() || rsig.is_grouped() {
            return Err(EngineError::Unsupported(
                "cannot join on a grouped column".to_string(),
            ));
        }
        if lsig.data_type != rsig.data_type {
            return Err(EngineError::TypeMismatch(format!(
                "join key {} is {} but {} is {}",
                lsig.name, lsig.data_type, rsig.name, rsig.data_type
            )));
        }
    }
    Ok(())
}

/// Decode the key columns to dense payloads.
pub(super) fn decode_keys(relation: &Relation, keys: &[Signature]) -> Result<Vec<RawData>> {
    keys.iter()
        .map(|signature| {
            relation
                .column(signature)
                .map(|column| column.raw_data())
                .ok_or_else(|| EngineError::ColumnNotFound(signature.name.clone()))
        })
        .collect()
}

/// One map per key column from value to the ordered list of rows where
/// it appears.
fn build_key_maps(
    relation: &Relation,
    keys: &[Signature],
) -> Result<Vec<HashMap<HashKey, Vec<usize>>>> {
    let mut maps = Vec::with_capacity(keys.len());
    for data in decode_keys(relation, keys)? {
        let mut map: HashMap<HashKey, Vec<usize>> = HashMap::new();
        for row in 0..data.len() {
            if let Some(key) = data.hash_key(row) {
                map.entry(key).or_default().push(row);
            }
        }
        maps.push(map);
    }
    Ok(maps)
}

/// Build rows matching one probe row: the intersection of the
/// per-column row lists, in build order.
fn intersect_matches(
    maps: &[HashMap<HashKey, Vec<usize>>],
    probe_data: &[RawData],
    probe_row: usize,
) -> Vec<usize> {
    let mut surviving: Vec<usize> = Vec::new();
    for (index, (map, data)) in maps.iter().zip(probe_data).enumerate() {
        let key = match data.hash_key(probe_row) {
            Some(key) => key,
            None => return Vec::new(),
        };
        let rows = match map.get(&key) {
            Some(rows) => rows,
            None => return Vec::new(),
        };
        if index == 0 {
            surviving = rows.clone();
        } else {
            // lists are in ascending row order by construction
            surviving.retain(|row| rows.binary_search(row).is_ok());
        }
        if surviving.is_empty() {
            return surviving;
        }
    }
    surviving
}
