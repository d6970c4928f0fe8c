//! Console demo for the column store engine.
//!
//! Without arguments it runs a built-in query pipeline over a small
//! sales data set. Given a path to a JSON config describing relations
//! and their delimited files, it creates the relations through the
//! catalog, bulk-loads them and prints each one.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use column_store::{
    AggrFunc, Catalog, Column, Comparison, DataType, Encoding, JoinType, Relation, Signature,
    SortOrder, Value,
};

#[derive(Debug, Deserialize)]
struct Config {
    relations: Vec<RelationSpec>,
}

#[derive(Debug, Deserialize)]
struct RelationSpec {
    name: String,
    file: PathBuf,
    separator: Option<char>,
    columns: Vec<ColumnSpec>,
}

#[derive(Debug, Deserialize)]
struct ColumnSpec {
    name: String,
    #[serde(rename = "type")]
    data_type: DataType,
    encoding: Option<Encoding>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match std::env::args().nth(1) {
        Some(config_path) => load_from_config(&config_path),
        None => run_builtin_demo(),
    }
}

/// Create, load and print every relation described by the config.
fn load_from_config(path: &str) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path))?;
    let config: Config =
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path))?;

    let catalog = Catalog::new();
    for spec in &config.relations {
        let signatures: Vec<Signature> = spec
            .columns
            .iter()
            .map(|col| {
                Signature::new(
                    col.name.clone(),
                    col.data_type,
                    col.encoding.unwrap_or(Encoding::Plain),
                )
            })
            .collect();
        let Some(handle) = catalog.create_relation(&spec.name, &signatures) else {
            bail!("relation {} has no columns", spec.name);
        };
        handle
            .write()
            .load(&spec.file, spec.separator.unwrap_or(','))
            .with_context(|| format!("loading {} from {}", spec.name, spec.file.display()))?;
        handle.read().print();
    }
    Ok(())
}

/// A fixed pipeline over in-memory sample data, in the spirit of a
/// console scratchpad: load, filter, project, sort, join, aggregate,
/// printing each intermediate relation.
fn run_builtin_demo() -> Result<()> {
    let region = Signature::new("Region", DataType::Text, Encoding::Dict);
    let product = Signature::new("Product", DataType::Text, Encoding::Dict);
    let units = Signature::new("Units", DataType::Int, Encoding::Rle);
    let price = Signature::new("Price", DataType::Float, Encoding::Plain);

    let sales = Relation::from_columns(
        "Sales",
        vec![
            Column::with_values(
                region.clone(),
                ["north", "north", "south", "south", "west", "north"]
                    .map(|s| Value::Text(s.into())),
            )?,
            Column::with_values(
                product.clone(),
                ["bolt", "nut", "bolt", "washer", "nut", "bolt"]
                    .map(|s| Value::Text(s.into())),
            )?,
            Column::with_values(units.clone(), [12i64, 3, 7, 7, 25, 8].map(Value::Int))?,
            Column::with_values(
                price.clone(),
                [0.35f64, 0.12, 0.35, 0.08, 0.12, 0.35].map(Value::Float),
            )?,
        ],
    );
    sales.print();

    let bulk = sales.select(&units, Comparison::Geq, &Value::Int(8))?;
    bulk.print();

    if let Some(listing) = bulk.scan(&[product.clone(), price.clone()]) {
        listing.print();
    }

    let ranked = sales.merge_sort(
        &[region.clone(), units.clone()],
        SortOrder::Descending,
    )?;
    ranked.print();

    let managers = Relation::from_columns(
        "Managers",
        vec![
            Column::with_values(
                Signature::new("Region", DataType::Text, Encoding::Plain),
                ["north", "south", "west"].map(|s| Value::Text(s.into())),
            )?,
            Column::with_values(
                Signature::new("Manager", DataType::Text, Encoding::Plain),
                ["ada", "grace", "edsger"].map(|s| Value::Text(s.into())),
            )?,
        ],
    );
    let staffed = sales.hash_join(
        &[region.clone()],
        &managers,
        &[Signature::new("Region", DataType::Text, Encoding::Plain)],
        JoinType::Inner,
        Comparison::Eq,
    )?;
    staffed.print();

    let totals = sales
        .group_by(&region)?
        .aggregate(&units, AggrFunc::Sum)?;
    totals.print();

    Ok(())
}
