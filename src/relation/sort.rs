//! Merge sort
//!
//! Sorts a relation's row indices with a classic stable merge sort and
//! materializes the permutation. The sort key is lexicographic over
//! the listed columns: ties on one key fall through to the next, and
//! rows that tie on every key keep their input order.

use std::cmp::Ordering;

use crate::column::RawData;
use crate::core::error::{EngineError, Result};
use crate::core::types::{Signature, SortOrder};

use super::Relation;

impl Relation {
    /// Sort the relation by the listed key columns.
    ///
    /// Ascending order compares with LT and falls through on EQ;
    /// descending uses GT and EQ. The output relation keeps the source
    /// schema with permuted rows and is named `<name>(sorted)`.
    /// Missing key columns and grouped key columns are fatal.
    pub fn merge_sort(&self, keys: &[Signature], order: SortOrder) -> Result<Relation> {
        let mut key_data = Vec::with_capacity(keys.len());
        for signature in keys {
            let column = self
                .column(signature)
                .ok_or_else(|| EngineError::ColumnNotFound(signature.name.clone()))?;
            if signature.is_grouped() {
                return Err(EngineError::Unsupported(format!(
                    "cannot sort on grouped column {}",
                    signature.name
                )));
            }
            key_data.push(column.raw_data());
        }

        let indices: Vec<usize> = (0..self.num_rows()).collect();
        let sorted = merge_sort(indices, &|a, b| cmp_keys(&key_data, order, a, b));
        self.take_rows(format!("{}(sorted)", self.name), &sorted)
    }
}

/// Lexicographic multi-key comparison of two row indices.
fn cmp_keys(keys: &[RawData], order: SortOrder, a: usize, b: usize) -> Ordering {
    for key in keys {
        let ord = key.cmp_rows(a, key, b).unwrap_or(Ordering::Equal);
        let ord = match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn merge_sort<F>(mut list: Vec<usize>, cmp: &F) -> Vec<usize>
where
    F: Fn(usize, usize) -> Ordering,
{
    if list.len() <= 1 {
        return list;
    }
    let right = list.split_off(list.len() / 2);
    merge(merge_sort(list, cmp), merge_sort(right, cmp), cmp)
}

/// Merge two sorted index runs, taking from the left run on ties to
/// keep the sort stable.
fn merge<F>(left: Vec<usize>, right: Vec<usize>, cmp: &F) -> Vec<usize>
where
    F: Fn(usize, usize) -> Ordering,
{
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if cmp(left[i], right[j]) != Ordering::Greater {
            out.push(left[i]);
            i += 1;
        } else {
            out.push(right[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::core::types::{DataType, Encoding};
    use crate::core::value::Value;

    fn unsorted() -> Relation {
        let columns = vec![
            Column::with_values(
                Signature::new("id", DataType::Int, Encoding::Plain),
                [5i64, 3, 8, 1, 9, 2, 7, 4, 6, 0].map(Value::Int),
            )
            .unwrap(),
            Column::with_values(
                Signature::new("tag", DataType::Text, Encoding::Plain),
                [5i64, 3, 8, 1, 9, 2, 7, 4, 6, 0]
                    .map(|i| Value::Text(format!("row{}", i))),
            )
            .unwrap(),
        ];
        Relation::from_columns("numbers", columns)
    }

    fn ints(rel: &Relation, col: usize) -> Vec<i64> {
        match &rel.raw_data().0[col] {
            RawData::Int(v) => v.clone(),
            other => panic!("expected ints, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_ascending() {
        let rel = unsorted();
        let key = Signature::new("id", DataType::Int, Encoding::Plain);
        let sorted = rel.merge_sort(&[key], SortOrder::Ascending).unwrap();
        assert_eq!(ints(&sorted, 0), (0..10).collect::<Vec<_>>());
        assert_eq!(sorted.name(), "numbers(sorted)");
    }

    #[test]
    fn test_sort_descending() {
        let rel = unsorted();
        let key = Signature::new("id", DataType::Int, Encoding::Plain);
        let sorted = rel.merge_sort(&[key], SortOrder::Descending).unwrap();
        assert_eq!(ints(&sorted, 0), (0..10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_sort_permutes_rows_together() {
        let rel = unsorted();
        let key = Signature::new("id", DataType::Int, Encoding::Plain);
        let sorted = rel.merge_sort(&[key], SortOrder::Ascending).unwrap();
        let (data, _) = sorted.raw_data();
        match (&data[0], &data[1]) {
            (RawData::Int(ids), RawData::Text(tags)) => {
                for (id, tag) in ids.iter().zip(tags) {
                    assert_eq!(tag, &format!("row{}", id));
                }
            }
            other => panic!("unexpected payloads {:?}", other),
        }
    }

    #[test]
    fn test_sort_is_a_permutation() {
        let rel = unsorted();
        let key = Signature::new("id", DataType::Int, Encoding::Plain);
        let sorted = rel.merge_sort(&[key], SortOrder::Ascending).unwrap();
        let mut before = ints(&rel, 0);
        let mut after = ints(&sorted, 0);
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn test_multi_key_lexicographic() {
        let columns = vec![
            Column::with_values(
                Signature::new("a", DataType::Int, Encoding::Plain),
                [2i64, 1, 2, 1].map(Value::Int),
            )
            .unwrap(),
            Column::with_values(
                Signature::new("b", DataType::Text, Encoding::Plain),
                ["x", "z", "w", "y"].map(|s| Value::Text(s.into())),
            )
            .unwrap(),
        ];
        let rel = Relation::from_columns("pairs", columns);
        let sorted = rel
            .merge_sort(
                &[
                    Signature::new("a", DataType::Int, Encoding::Plain),
                    Signature::new("b", DataType::Text, Encoding::Plain),
                ],
                SortOrder::Ascending,
            )
            .unwrap();
        let (data, _) = sorted.raw_data();
        assert_eq!(data[0], RawData::Int(vec![1, 1, 2, 2]));
        assert_eq!(
            data[1],
            RawData::Text(vec!["y".into(), "z".into(), "w".into(), "x".into()])
        );
    }

    #[test]
    fn test_all_equal_keys_preserve_input_order() {
        let columns = vec![
            Column::with_values(
                Signature::new("k", DataType::Int, Encoding::Plain),
                [7i64, 7, 7, 7].map(Value::Int),
            )
            .unwrap(),
            Column::with_values(
                Signature::new("pos", DataType::Int, Encoding::Plain),
                [0i64, 1, 2, 3].map(Value::Int),
            )
            .unwrap(),
        ];
        let rel = Relation::from_columns("ties", columns);
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let sorted = rel
                .merge_sort(&[Signature::new("k", DataType::Int, Encoding::Plain)], order)
                .unwrap();
            assert_eq!(ints(&sorted, 1), vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_stability_on_partial_ties() {
        let columns = vec![
            Column::with_values(
                Signature::new("k", DataType::Int, Encoding::Plain),
                [2i64, 1, 2, 1, 2].map(Value::Int),
            )
            .unwrap(),
            Column::with_values(
                Signature::new("pos", DataType::Int, Encoding::Plain),
                [0i64, 1, 2, 3, 4].map(Value::Int),
            )
            .unwrap(),
        ];
        let rel = Relation::from_columns("ties", columns);
        let sorted = rel
            .merge_sort(
                &[Signature::new("k", DataType::Int, Encoding::Plain)],
                SortOrder::Ascending,
            )
            .unwrap();
        assert_eq!(ints(&sorted, 1), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_sort_missing_key_is_fatal() {
        let rel = unsorted();
        let missing = Signature::new("nope", DataType::Int, Encoding::Plain);
        assert!(matches!(
            rel.merge_sort(&[missing], SortOrder::Ascending),
            Err(EngineError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_sort_empty_relation() {
        let rel = Relation::new(
            "empty",
            &[Signature::new("id", DataType::Int, Encoding::Plain)],
        );
        let sorted = rel
            .merge_sort(
                &[Signature::new("id", DataType::Int, Encoding::Plain)],
                SortOrder::Ascending,
            )
            .unwrap();
        assert_eq!(sorted.num_rows(), 0);
    }
}
