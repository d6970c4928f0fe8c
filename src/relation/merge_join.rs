//! Merge join
//!
//! Sort-merge join: both inputs are sorted ascending on their join
//! keys, then swept with two pointers. Because the right side is fully
//! sorted, a theta comparator can emit whole index ranges per left row:
//! the equal block `[r, nextR)` holds the right rows matching the
//! current left key, everything before is strictly smaller and
//! everything from `nextR` on is strictly greater.

use std::cmp::Ordering;

use crate::column::RawData;
use crate::core::error::{EngineError, Result};
use crate::core::types::{Comparison, JoinType, Signature, SortOrder};

use super::hash_join::{check_join_keys, decode_keys};
use super::Relation;

impl Relation {
    /// Join this relation (left) with `right` by sorting and merging.
    ///
    /// All six comparators are supported for `Inner`; `Semi` requires
    /// equality; outer joins require NULL support and fail. Output rows
    /// are ordered by the sorted left side; schema and naming mirror
    /// `hash_join`.
    pub fn merge_join(
        &self,
        left_keys: &[Signature],
        right: &Relation,
        right_keys: &[Signature],
        join: JoinType,
        comp: Comparison,
    ) -> Result<Relation> {
        check_join_keys(self, left_keys, right, right_keys)?;
        match join {
            JoinType::LeftOuter | JoinType::RightOuter => {
                return Err(EngineError::Unsupported(
                    "outer joins require NULL support".to_string(),
                ));
            }
            JoinType::Semi if comp != Comparison::Eq => {
                return Err(EngineError::Unsupported(format!(
                    "semi join requires an equality comparison, got {}",
                    comp
                )));
            }
            _ => {}
        }

        let left_sorted = self.merge_sort(left_keys, SortOrder::Ascending)?;
        let right_sorted = right.merge_sort(right_keys, SortOrder::Ascending)?;
        let left_data = decode_keys(&left_sorted, left_keys)?;
        let right_data = decode_keys(&right_sorted, right_keys)?;
        let sweep = Sweep {
            left: &left_data,
            right: &right_data,
            max_left: left_sorted.num_rows(),
            max_right: right_sorted.num_rows(),
        };

        match join {
            JoinType::Inner => {
                let (left_rows, right_rows) = sweep.inner(comp);
                let mut columns = left_sorted.take_columns(&left_rows, Some(&self.name))?;
                columns.extend(right_sorted.take_columns(&right_rows, Some(&right.name))?);
                Ok(Relation::from_columns(
                    format!("{} x {}", self.name, right.name),
                    columns,
                ))
            }
            JoinType::Semi => {
                let kept = sweep.semi();
                let columns = left_sorted.take_columns(&kept, Some(&self.name))?;
                Ok(Relation::from_columns(
                    format!("{} (x {})", self.name, right.name),
                    columns,
                ))
            }
            _ => unreachable!("outer joins rejected above"),
        }
    }
}

/// Two-pointer sweep over the sorted key columns of both sides.
struct Sweep<'a> {
    left: &'a [RawData],
    right: &'a [RawData],
    max_left: usize,
    max_right: usize,
}

impl Sweep<'_> {
    /// Lexicographic multi-key comparison of left row `l` against
    /// right row `r`.
    fn cmp(&self, l: usize, r: usize) -> Ordering {
        for (lkey, rkey) in self.left.iter().zip(self.right) {
            match lkey.cmp_rows(l, rkey, r).unwrap_or(Ordering::Equal) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// First right index past `r` whose key differs from left row `l`.
    fn end_of_equal_block(&self, l: usize, r: usize) -> usize {
        let mut next = r + 1;
        while next < self.max_right && self.cmp(l, next) == Ordering::Equal {
            next += 1;
        }
        next
    }

    /// First right index past `r` whose key is no longer smaller than
    /// left row `l`.
    fn end_of_lesser_block(&self, l: usize, r: usize) -> usize {
        let mut next = r + 1;
        while next < self.max_right && self.cmp(l, next) == Ordering::Greater {
            next += 1;
        }
        next
    }

    fn inner(&self, comp: Comparison) -> (Vec<usize>, Vec<usize>) {
        let mut pairs: Vec<(usize, usize)> = Vec::new();

        fn emit(pairs: &mut Vec<(usize, usize)>, l: usize, range: std::ops::Range<usize>) {
            for i in range {
                pairs.push((l, i));
            }
        }

        let (mut l, mut r) = (0, 0);
        while l < self.max_left && r < self.max_right {
            match self.cmp(l, r) {
                Ordering::Equal => {
                    let next_r = self.end_of_equal_block(l, r);
                    match comp {
                        Comparison::Eq => emit(&mut pairs, l, r..next_r),
                        Comparison::Neq => {
                            emit(&mut pairs, l, 0..r);
                            emit(&mut pairs, l, next_r..self.max_right);
                        }
                        Comparison::Lt => emit(&mut pairs, l, next_r..self.max_right),
                        Comparison::Leq => emit(&mut pairs, l, r..self.max_right),
                        Comparison::Gt => emit(&mut pairs, l, 0..r),
                        Comparison::Geq => emit(&mut pairs, l, 0..next_r),
                    }
                    l += 1;
                }
                Ordering::Less => {
                    match comp {
                        Comparison::Eq => {}
                        Comparison::Neq => {
                            for i in 0..self.max_right {
                                if self.cmp(l, i) != Ordering::Equal {
                                    pairs.push((l, i));
                                }
                            }
                        }
                        Comparison::Lt | Comparison::Leq => {
                            emit(&mut pairs, l, r..self.max_right)
                        }
                        Comparison::Gt | Comparison::Geq => emit(&mut pairs, l, 0..r),
                    }
                    l += 1;
                }
                Ordering::Greater => {
                    r = self.end_of_lesser_block(l, r);
                }
            }
        }
        pairs.into_iter().unzip()
    }

    fn semi(&self) -> Vec<usize> {
        let mut kept = Vec::new();
        let (mut l, mut r) = (0, 0);
        while l < self.max_left && r < self.max_right {
            match self.cmp(l, r) {
                Ordering::Equal => {
                    kept.push(l);
                    l += 1;
                }
                Ordering::Less => l += 1,
                Ordering::Greater => {
                    r = self.end_of_lesser_block(l, r);
                }
            }
        }
        kept
    }
}
