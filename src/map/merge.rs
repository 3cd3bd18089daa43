use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use anyhow::{ensure, Result};
use polars::{frame::DataFrame, prelude::*, series::Series};

use crate::error::{MergeError, Outcome, Warning};
use super::{layer::{JoinCardinality, VillageLayer}, shapes::VillageShapes, sheet::VillageSheet};

const GEOM_IDX: &str = "geom_idx";

/// Keys that occur more than once, ignoring nulls.
fn repeated_keys(keys: &[Option<String>]) -> BTreeSet<String> {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_default() += 1;
    }
    counts.into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Left-join village shapes to sheet rows on the normalised key.
///
/// Every geometry row is kept, in order; rows without a sheet match get null
/// attributes. Repeated geometry keys select `ManyToOne`. A repeated sheet key
/// would copy its votes onto unrelated rows, so it fails with
/// `MergeError::FanOut` before joining.
pub fn merge(shapes: VillageShapes, sheet: &VillageSheet) -> Result<Outcome<VillageLayer>> {
    let schema = sheet.schema();
    let key = schema.key.as_str();

    let sheet_keys = sheet.keys()?;
    let sheet_repeats = repeated_keys(&sheet_keys);
    if !sheet_repeats.is_empty() {
        return Err(MergeError::FanOut {
            column: key.to_string(),
            keys: sheet_repeats.into_iter().collect(),
        }.into())
    }

    let (geoms, geom_keys) = shapes.into_parts();
    let cardinality = if repeated_keys(&geom_keys).is_empty() {
        JoinCardinality::OneToOne
    } else {
        JoinCardinality::ManyToOne
    };

    let known = sheet_keys.iter().flatten().map(String::as_str).collect::<AHashSet<_>>();
    let unmatched = geom_keys.iter()
        .filter(|k| k.as_deref().is_none_or(|k| !known.contains(k)))
        .count();

    let height = geom_keys.len();
    let left = DataFrame::new(vec![
        Series::new(key.into(), geom_keys).into(),
        Series::new(GEOM_IDX.into(), (0..height as u32).collect::<Vec<_>>()).into(),
    ])?;

    let data = left.lazy()
        .left_join(sheet.data().clone().lazy(), col(key), col(key))
        .collect()?
        .sort([GEOM_IDX], SortMultipleOptions::default())?
        .drop(GEOM_IDX)?;

    ensure!(
        data.height() == height,
        "[merge] join produced {} rows for {} geometries", data.height(), height
    );

    log::info!(
        "[merge] {height} geometry rows, {} sheet rows, {cardinality:?}, {unmatched} unmatched",
        sheet.len()
    );

    let mut warnings = Vec::new();
    if unmatched > 0 {
        warnings.push(Warning::UnmatchedKeys { count: unmatched, total: height });
    }

    let layer = VillageLayer::new(
        geoms,
        data,
        schema.clone(),
        sheet.demographics().to_vec(),
        cardinality,
    );
    Ok(Outcome::with_warnings(layer, warnings))
}
