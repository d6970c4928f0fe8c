//! End-to-end scenarios: catalog, bulk load and operator pipelines
//! working together the way a driver uses them.

use std::io::Write;

use crate::catalog::Catalog;
use crate::column::{Column, RawData};
use crate::core::types::{
    AggrFunc, Comparison, DataType, Encoding, JoinType, Signature, SortOrder,
};
use crate::core::value::Value;
use crate::relation::Relation;

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn ints(rel: &Relation, col: usize) -> Vec<i64> {
    match &rel.raw_data().0[col] {
        RawData::Int(v) => v.clone(),
        other => panic!("expected ints, got {:?}", other),
    }
}

fn texts(rel: &Relation, col: usize) -> Vec<String> {
    match &rel.raw_data().0[col] {
        RawData::Text(v) => v.clone(),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_load_project_select_pipeline() {
    let file = write_csv("1,a\n2,b\n3,c\n4,d\n5,e");
    let catalog = Catalog::new();
    let col1 = Signature::new("col1", DataType::Int, Encoding::Plain);
    let col2 = Signature::new("col2", DataType::Text, Encoding::Plain);

    let handle = catalog
        .create_relation("pairs", &[col1.clone(), col2.clone()])
        .unwrap();
    handle.write().load(file.path(), ',').unwrap();

    let relation = handle.read();
    let projected = relation.scan(std::slice::from_ref(&col1)).unwrap();
    assert_eq!(ints(&projected, 0), vec![1, 2, 3, 4, 5]);
    assert_eq!(projected.columns().len(), 1);

    let selected = relation.select(&col1, Comparison::Geq, &Value::Int(3)).unwrap();
    assert_eq!(ints(&selected, 0), vec![3, 4, 5]);
    assert_eq!(texts(&selected, 1), vec!["c", "d", "e"]);
}

#[test]
fn test_select_matrix_on_loaded_mixed_types() {
    let file = write_csv(
        "0,val1,1.0\n1,val2,0.9\n2,val1,0.8\n3,val2,0.7\n4,val1,0.6\n\
         5,val2,0.5\n6,val1,0.4\n7,val2,0.3\n8,val1,0.2\n9,val2,0.1",
    );
    let int_col = Signature::new("testCol1", DataType::Int, Encoding::Plain);
    let text_col = Signature::new("testCol2", DataType::Text, Encoding::Plain);
    let float_col = Signature::new("testCol3", DataType::Float, Encoding::Plain);

    let mut relation = Relation::new(
        "testRel",
        &[int_col.clone(), text_col.clone(), float_col.clone()],
    );
    relation.load(file.path(), ',').unwrap();
    assert_eq!(relation.num_rows(), 10);

    let eq_int = relation.select(&int_col, Comparison::Eq, &Value::Int(3)).unwrap();
    assert_eq!(ints(&eq_int, 0), vec![3]);

    let neq_int = relation.select(&int_col, Comparison::Neq, &Value::Int(5)).unwrap();
    assert_eq!(neq_int.num_rows(), 9);
    assert!(!ints(&neq_int, 0).contains(&5));

    let lt_float = relation
        .select(&float_col, Comparison::Lt, &Value::Float(0.5))
        .unwrap();
    assert_eq!(ints(&lt_float, 0), vec![6, 7, 8, 9]);

    let eq_text = relation
        .select(&text_col, Comparison::Eq, &Value::Text("val1".into()))
        .unwrap();
    assert_eq!(ints(&eq_text, 0), vec![0, 2, 4, 6, 8]);
}

#[test]
fn test_join_pipeline_from_files() {
    let left_file = write_csv("1\n2\n3");
    let right_file = write_csv("2\n3\n4");
    let catalog = Catalog::new();
    let left_key = Signature::new("leftCol1", DataType::Int, Encoding::Plain);
    let right_key = Signature::new("rightCol1", DataType::Int, Encoding::Plain);

    let left = catalog
        .create_relation("left", std::slice::from_ref(&left_key))
        .unwrap();
    left.write().load(left_file.path(), ',').unwrap();
    let right = catalog
        .create_relation("right", std::slice::from_ref(&right_key))
        .unwrap();
    right.write().load(right_file.path(), ',').unwrap();

    let left = left.read();
    let right = right.read();

    let hashed = left
        .hash_join(
            std::slice::from_ref(&left_key),
            &right,
            std::slice::from_ref(&right_key),
            JoinType::Inner,
            Comparison::Eq,
        )
        .unwrap();
    assert_eq!(ints(&hashed, 0), vec![2, 3]);
    assert_eq!(ints(&hashed, 1), vec![2, 3]);

    let merged_lt = left
        .merge_join(
            std::slice::from_ref(&left_key),
            &right,
            std::slice::from_ref(&right_key),
            JoinType::Inner,
            Comparison::Lt,
        )
        .unwrap();
    assert_eq!(ints(&merged_lt, 0), vec![1, 1, 1, 2, 2, 3]);
    assert_eq!(ints(&merged_lt, 1), vec![2, 3, 4, 3, 4, 4]);
}

#[test]
fn test_group_then_sum_pipeline() {
    let file = write_csv("a,1\na,2\nb,3");
    let key = Signature::new("k", DataType::Text, Encoding::Plain);
    let val = Signature::new("v", DataType::Int, Encoding::Plain);

    let mut relation = Relation::new("kv", &[key.clone(), val.clone()]);
    relation.load(file.path(), ',').unwrap();

    let summed = relation
        .group_by(&key)
        .unwrap()
        .aggregate(&val, AggrFunc::Sum)
        .unwrap();

    let mut pairs: Vec<(String, i64)> = texts(&summed, 0)
        .into_iter()
        .zip(ints(&summed, 1))
        .collect();
    pairs.sort();
    assert_eq!(pairs, vec![("a".to_string(), 3), ("b".to_string(), 3)]);
}

#[test]
fn test_encoded_columns_behave_like_plain_through_operators() {
    let content = "x,1\ny,1\ny,2\nx,2\nx,1\nx,1";
    let plain_file = write_csv(content);
    let encoded_file = write_csv(content);

    let plain_sigs = [
        Signature::new("tag", DataType::Text, Encoding::Plain),
        Signature::new("n", DataType::Int, Encoding::Plain),
    ];
    let encoded_sigs = [
        Signature::new("tag", DataType::Text, Encoding::Dict),
        Signature::new("n", DataType::Int, Encoding::Rle),
    ];

    let mut plain = Relation::new("data", &plain_sigs);
    plain.load(plain_file.path(), ',').unwrap();
    let mut encoded = Relation::new("data", &encoded_sigs);
    encoded.load(encoded_file.path(), ',').unwrap();

    // identical decoded payloads
    assert_eq!(plain.raw_data().0, encoded.raw_data().0);

    // identical select results
    let plain_sel = plain
        .select(&plain_sigs[0], Comparison::Eq, &Value::Text("x".into()))
        .unwrap();
    let encoded_sel = encoded
        .select(&encoded_sigs[0], Comparison::Eq, &Value::Text("x".into()))
        .unwrap();
    assert_eq!(plain_sel.raw_data().0, encoded_sel.raw_data().0);

    // identical sort results
    let plain_sorted = plain
        .merge_sort(&plain_sigs[1..], SortOrder::Descending)
        .unwrap();
    let encoded_sorted = encoded
        .merge_sort(&encoded_sigs[1..], SortOrder::Descending)
        .unwrap();
    assert_eq!(plain_sorted.raw_data().0, encoded_sorted.raw_data().0);
}

#[test]
fn test_operators_leave_inputs_untouched() {
    let columns = vec![
        Column::with_values(
            Signature::new("k", DataType::Int, Encoding::Plain),
            [3i64, 1, 2].map(Value::Int),
        )
        .unwrap(),
    ];
    let relation = Relation::from_columns("immutable", columns);
    let snapshot = relation.clone();

    let key = Signature::new("k", DataType::Int, Encoding::Plain);
    relation.merge_sort(std::slice::from_ref(&key), SortOrder::Ascending).unwrap();
    relation.select(&key, Comparison::Gt, &Value::Int(1)).unwrap();
    relation.group_by(&key).unwrap();
    relation.scan(std::slice::from_ref(&key)).unwrap();

    assert_eq!(relation, snapshot);
}

#[test]
fn test_printed_pipeline_output() {
    let file = write_csv("a,1\na,2\nb,3");
    let key = Signature::new("k", DataType::Text, Encoding::Plain);
    let val = Signature::new("v", DataType::Int, Encoding::Plain);

    let mut relation = Relation::new("kv", &[key.clone(), val]);
    relation.load(file.path(), ',').unwrap();

    let grouped = relation.group_by(&key).unwrap();
    let rendered = grouped.format_table();
    assert!(rendered.contains("kv(grouped)"));
    // the "a" group expands into two physical lines
    assert!(rendered.contains("| 1 |"));
    assert!(rendered.contains("| 2 |"));
    assert!(rendered.contains("| b | 3 |"));
}
