use std::path::Path;

use anyhow::Result;
use polars::frame::DataFrame;

use crate::{ac::AcAggregate, io::csv, map::VillageLayer};
use super::{MapLevel, ViewState};

/// Constituency statistics sorted by key, the missing key last.
pub fn ac_summary(layer: &VillageLayer, group_column: &str) -> Result<DataFrame> {
    AcAggregate::from_layer(layer, group_column)?.to_dataframe()
}

/// First `rows` villages: key, names, constituencies, shares, demographics.
pub fn village_summary(layer: &VillageLayer, rows: usize) -> Result<DataFrame> {
    let schema = layer.schema();
    let columns = std::iter::once(schema.key.as_str())
        .chain(schema.text_columns())
        .chain(schema.share_columns())
        .chain(layer.demographics().iter().map(String::as_str))
        .filter(|c| layer.has_column(c))
        .collect::<Vec<_>>();
    Ok(layer.data().select(columns)?.head(Some(rows)))
}

/// The summary table for `state`.
pub fn summary_table(state: &ViewState, layer: &VillageLayer, rows: usize) -> Result<DataFrame> {
    match state.level {
        MapLevel::Village => village_summary(layer, rows),
        MapLevel::AssemblyConstituency => ac_summary(layer, state.group_column(layer.schema())),
    }
}

pub fn summary_to_csv(df: &mut DataFrame) -> Result<String> {
    csv::write_csv_string(df)
}

pub fn write_summary(df: &mut DataFrame, path: &Path) -> Result<()> {
    csv::write_csv(df, path)
}
