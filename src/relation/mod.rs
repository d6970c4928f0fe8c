//! Relation
//!
//! A relation is a named, ordered list of equal-length columns. It owns
//! the operator kernel: bulk load, scan (projection), select (filter),
//! merge sort, hash join, merge join, group-by and aggregate, plus the
//! pretty printer. Operators never mutate their inputs; every operator
//! produces a new relation. Bulk load is the only mutating entry point.

mod group;
mod hash_join;
mod merge_join;
mod print;
mod sort;

use std::path::Path;

use tracing::{debug, warn};

use crate::column::{Column, RawData};
use crate::core::error::{EngineError, Result};
use crate::core::types::{Comparison, Signature};
use crate::core::value::Value;
use crate::reader::LineReader;

/// A named, ordered collection of columns of equal length.
///
/// Columns are addressed by full signature, so a relation must not
/// contain two columns with identical signatures.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: String,
    columns: Vec<Column>,
}

impl Relation {
    /// Create an empty relation with one column per signature.
    pub fn new(name: impl Into<String>, signatures: &[Signature]) -> Self {
        Self {
            name: name.into(),
            columns: signatures.iter().cloned().map(Column::new).collect(),
        }
    }

    /// Create a relation from already-built columns.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// The relation's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The relation's columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows (all columns share the same length after load).
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::num_rows)
    }

    /// The column with the given signature, if present.
    pub fn column(&self, signature: &Signature) -> Option<&Column> {
        self.columns.iter().find(|c| c.signature() == signature)
    }

    /// Bulk-load delimited text into the relation.
    ///
    /// Each non-empty line is split on `separator` and imported
    /// positionally. Open failures, a field count differing from the
    /// column count, and per-field parse failures all abort the load.
    /// Rows imported before a mid-file failure are kept; the relation
    /// is then partially populated (documented limitation).
    pub fn load(&mut self, path: impl AsRef<Path>, separator: char) -> Result<()> {
        let mut reader = LineReader::open(path.as_ref())?;
        let mut rows = 0usize;
        while let Some(line) = reader.read_line()? {
            let fields: Vec<&str> = line.split(separator).collect();
            if fields.len() != self.columns.len() {
                warn!(
                    relation = %self.name,
                    line = rows + 1,
                    "aborting load, relation may be partially populated"
                );
                return Err(EngineError::SchemaMismatch {
                    expected: self.columns.len(),
                    found: fields.len(),
                });
            }
            for (column, field) in self.columns.iter_mut().zip(fields) {
                column.import_row(field)?;
            }
            rows += 1;
        }
        debug!(relation = %self.name, rows, "bulk load complete");
        Ok(())
    }

    /// Project the relation onto the listed signatures.
    ///
    /// The result keeps the relation's name and the source column
    /// order (not the order of the argument list); column payloads are
    /// shared by handle copy. Returns `None` when nothing matches.
    pub fn scan(&self, signatures: &[Signature]) -> Option<Relation> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|column| signatures.contains(column.signature()))
            .cloned()
            .collect();
        if columns.is_empty() {
            return None;
        }
        Some(Relation {
            name: self.name.clone(),
            columns,
        })
    }

    /// Filter rows by a single-column predicate.
    ///
    /// Keeps exactly the rows whose value in `signature` satisfies
    /// `value <comp> literal`, in source order. A comparator with no
    /// implementation for the column (grouped payload, or a literal of
    /// a different type) yields an empty relation with the same schema
    /// rather than an error. A missing column is fatal.
    pub fn select(
        &self,
        signature: &Signature,
        comp: Comparison,
        literal: &Value,
    ) -> Result<Relation> {
        let filter = self
            .column(signature)
            .ok_or_else(|| EngineError::ColumnNotFound(signature.name.clone()))?;

        let comparable = !signature.is_grouped()
            && !literal.is_grouped()
            && literal.data_type() == signature.data_type;
        if !comparable {
            warn!(
                relation = %self.name,
                column = %signature.name,
                comparison = %comp,
                "no comparator implementation, returning empty relation"
            );
            return Ok(self.empty_like());
        }

        let mut kept = Vec::new();
        for row in 0..filter.num_rows() {
            let value = filter.get_row(row)?;
            if value.compare(comp, literal).unwrap_or(false) {
                kept.push(row);
            }
        }
        self.take_rows(self.name.clone(), &kept)
    }

    /// All columns decoded to dense typed vectors, with their
    /// signatures.
    pub fn raw_data(&self) -> (Vec<RawData>, Vec<Signature>) {
        let mut data = Vec::with_capacity(self.columns.len());
        let mut signatures = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            data.push(column.raw_data());
            signatures.push(column.signature().clone());
        }
        (data, signatures)
    }

    /// Fresh empty relation with this relation's schema and name.
    pub(crate) fn empty_like(&self) -> Relation {
        Relation {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| Column::new(column.signature().clone()))
                .collect(),
        }
    }

    /// Materialize the given rows (in the given order) into a new
    /// relation with this schema.
    pub(crate) fn take_rows(&self, name: String, rows: &[usize]) -> Result<Relation> {
        Ok(Relation {
            name,
            columns: self.take_columns(rows, None)?,
        })
    }

    /// Materialize the given rows of every column, optionally renaming
    /// each column to `<prefix>.<name>` (used by the join operators).
    pub(crate) fn take_columns(
        &self,
        rows: &[usize],
        prefix: Option<&str>,
    ) -> Result<Vec<Column>> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for source in &self.columns {
            let signature = match prefix {
                Some(prefix) => source
                    .signature()
                    .renamed(format!("{}.{}", prefix, source.signature().name)),
                None => source.signature().clone(),
            };
            let data_type = signature.data_type;
            let mut column = Column::new(signature);
            for &row in rows {
                column.add_row(data_type, source.get_row(row)?)?;
            }
            columns.push(column);
        }
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DataType, Encoding};
    use std::io::Write;

    fn test_relation() -> Relation {
        let columns = vec![
            Column::with_values(
                Signature::new("testCol1", DataType::Int, Encoding::Plain),
                (0..10).map(Value::Int),
            )
            .unwrap(),
            Column::with_values(
                Signature::new("testCol2", DataType::Text, Encoding::Plain),
                (0..10).map(|i| {
                    Value::Text(if i % 2 == 0 { "val1".into() } else { "val2".into() })
                }),
            )
            .unwrap(),
            Column::with_values(
                Signature::new("testCol3", DataType::Float, Encoding::Plain),
                (0..10).map(|i| Value::Float((10 - i) as f64 / 10.0)),
            )
            .unwrap(),
        ];
        Relation::from_columns("testRel", columns)
    }

    fn ints(raw: &RawData) -> Vec<i64> {
        match raw {
            RawData::Int(v) => v.clone(),
            other => panic!("expected ints, got {:?}", other),
        }
    }

    #[test]
    fn test_load_matches_file_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1,a\n2,b\n3,c\n4,d\n5,e").unwrap();
        file.flush().unwrap();

        let mut rel = Relation::new(
            "testRel1",
            &[
                Signature::new("col1", DataType::Int, Encoding::Plain),
                Signature::new("col2", DataType::Text, Encoding::Plain),
            ],
        );
        rel.load(file.path(), ',').unwrap();

        let (data, _) = rel.raw_data();
        assert_eq!(data[0], RawData::Int(vec![1, 2, 3, 4, 5]));
        assert_eq!(
            data[1],
            RawData::Text(vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()])
        );
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut rel = Relation::new(
            "testRel",
            &[Signature::new("col1", DataType::Int, Encoding::Plain)],
        );
        assert!(matches!(
            rel.load("_no_such_file.csv", ',').unwrap_err(),
            EngineError::Io(_)
        ));
    }

    #[test]
    fn test_load_rejects_malformed_field_counts() {
        for content in ["a,b,c\nd,e,f,g", "a,b,c,d", "a,b", "a,b,c,", ",,,,"] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(content.as_bytes()).unwrap();
            file.flush().unwrap();

            let mut rel = Relation::new(
                "testRel",
                &[
                    Signature::new("testCol1", DataType::Text, Encoding::Plain),
                    Signature::new("testCol2", DataType::Text, Encoding::Plain),
                    Signature::new("testCol3", DataType::Text, Encoding::Plain),
                ],
            );
            assert!(
                matches!(
                    rel.load(file.path(), ','),
                    Err(EngineError::SchemaMismatch { .. })
                ),
                "content {:?} should fail",
                content
            );
        }
    }

    #[test]
    fn test_load_parse_failure_keeps_partial_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1\n2\nthree\n4").unwrap();
        file.flush().unwrap();

        let mut rel = Relation::new(
            "partial",
            &[Signature::new("n", DataType::Int, Encoding::Plain)],
        );
        assert!(matches!(
            rel.load(file.path(), ',').unwrap_err(),
            EngineError::Parse(_)
        ));
        // rows before the failure stay loaded
        assert_eq!(rel.num_rows(), 2);
    }

    #[test]
    fn test_scan_keeps_source_column_order() {
        let rel = test_relation();
        let projected = rel
            .scan(&[
                Signature::new("testCol3", DataType::Float, Encoding::Plain),
                Signature::new("testCol1", DataType::Int, Encoding::Plain),
            ])
            .unwrap();
        let (_, sigs) = projected.raw_data();
        assert_eq!(sigs.len(), 2);
        // source order, not argument order
        assert_eq!(sigs[0].name, "testCol1");
        assert_eq!(sigs[1].name, "testCol3");
        assert_eq!(projected.name(), "testRel");
    }

    #[test]
    fn test_scan_full_list_is_identity() {
        let rel = test_relation();
        let (_, sigs) = rel.raw_data();
        let projected = rel.scan(&sigs).unwrap();
        assert_eq!(projected.raw_data(), rel.raw_data());
    }

    #[test]
    fn test_scan_disjoint_list_is_none() {
        let rel = test_relation();
        assert!(rel
            .scan(&[Signature::new("missing", DataType::Int, Encoding::Plain)])
            .is_none());
        assert!(rel.scan(&[]).is_none());
    }

    #[test]
    fn test_select_every_comparator_on_ints() {
        let rel = test_relation();
        let col = Signature::new("testCol1", DataType::Int, Encoding::Plain);
        let cases: &[(Comparison, i64, &[i64])] = &[
            (Comparison::Eq, 3, &[3]),
            (Comparison::Neq, 5, &[0, 1, 2, 3, 4, 6, 7, 8, 9]),
            (Comparison::Lt, 4, &[0, 1, 2, 3]),
            (Comparison::Leq, 2, &[0, 1, 2]),
            (Comparison::Gt, 8, &[9]),
            (Comparison::Geq, 6, &[6, 7, 8, 9]),
        ];
        for (comp, literal, expected) in cases {
            let result = rel.select(&col, *comp, &Value::Int(*literal)).unwrap();
            let (data, _) = result.raw_data();
            assert_eq!(ints(&data[0]), expected.to_vec(), "comparator {:?}", comp);
        }
    }

    #[test]
    fn test_select_on_floats() {
        let rel = test_relation();
        let col = Signature::new("testCol3", DataType::Float, Encoding::Plain);
        let result = rel.select(&col, Comparison::Lt, &Value::Float(0.5)).unwrap();
        let (data, _) = result.raw_data();
        assert_eq!(ints(&data[0]), vec![6, 7, 8, 9]);

        let result = rel.select(&col, Comparison::Eq, &Value::Float(0.4)).unwrap();
        let (data, _) = result.raw_data();
        assert_eq!(ints(&data[0]), vec![6]);
    }

    #[test]
    fn test_select_on_text_including_ordering() {
        let rel = test_relation();
        let col = Signature::new("testCol2", DataType::Text, Encoding::Plain);
        let result = rel
            .select(&col, Comparison::Eq, &Value::Text("val1".into()))
            .unwrap();
        let (data, _) = result.raw_data();
        assert_eq!(ints(&data[0]), vec![0, 2, 4, 6, 8]);

        // lexicographic ordering comparators are implemented for text
        let result = rel
            .select(&col, Comparison::Lt, &Value::Text("val2".into()))
            .unwrap();
        let (data, _) = result.raw_data();
        assert_eq!(ints(&data[0]), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_select_mismatched_literal_returns_empty_schema_preserving() {
        let rel = test_relation();
        let col = Signature::new("testCol1", DataType::Int, Encoding::Plain);
        let result = rel
            .select(&col, Comparison::Eq, &Value::Text("3".into()))
            .unwrap();
        assert_eq!(result.num_rows(), 0);
        assert_eq!(result.columns().len(), 3);
    }

    #[test]
    fn test_select_missing_column_is_fatal() {
        let rel = test_relation();
        let missing = Signature::new("nope", DataType::Int, Encoding::Plain);
        assert!(matches!(
            rel.select(&missing, Comparison::Eq, &Value::Int(1)),
            Err(EngineError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_select_preserves_other_columns_row_alignment() {
        let rel = test_relation();
        let col = Signature::new("testCol1", DataType::Int, Encoding::Plain);
        let result = rel.select(&col, Comparison::Geq, &Value::Int(8)).unwrap();
        let (data, _) = result.raw_data();
        assert_eq!(ints(&data[0]), vec![8, 9]);
        assert_eq!(
            data[1],
            RawData::Text(vec!["val1".into(), "val2".into()])
        );
        assert_eq!(data[2], RawData::Float(vec![0.2, 0.1]));
    }
}
