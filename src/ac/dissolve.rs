use ahash::AHashMap;
use anyhow::{ensure, Result};
use polars::frame::DataFrame;

use crate::{geom::Geometries, map::VillageLayer};
use super::aggregate::{compare_keys, stats_frame, AcAggregate, AcStats};

/// Dissolved constituency polygons joined with their statistics.
#[derive(Debug, Clone)]
pub struct AcLayer {
    geoms: Geometries,
    keys: Vec<Option<String>>,
    /// Row of `aggregate` per polygon.
    rows: Vec<Option<usize>>,
    aggregate: AcAggregate,
    data: DataFrame,
}

impl AcLayer {
    #[inline] pub fn len(&self) -> usize { self.keys.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    /// One key per polygon, sorted, the missing key last.
    #[inline] pub fn keys(&self) -> &[Option<String>] { &self.keys }

    #[inline] pub fn group_column(&self) -> &str { self.aggregate.group_column() }

    #[inline] pub fn aggregate(&self) -> &AcAggregate { &self.aggregate }

    /// Attribute rows, index-aligned with `geoms()`.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Statistics of polygon `index`.
    pub fn stats(&self, index: usize) -> Option<&AcStats> {
        self.rows.get(index).copied().flatten().map(|row| &self.aggregate.stats()[row])
    }
}

/// Union village polygons sharing a value of `group_column`, one polygon per
/// value (missing values included), then left-join the aggregate statistics.
pub fn dissolve(layer: &VillageLayer, group_column: &str) -> Result<AcLayer> {
    ensure!(
        layer.has_column(group_column),
        "[dissolve] missing group column {group_column:?}"
    );

    let mut members: AHashMap<Option<String>, Vec<usize>> = AHashMap::new();
    for (i, key) in layer.text_values(group_column)?.into_iter().enumerate() {
        members.entry(key).or_default().push(i);
    }

    let mut groups = members.into_iter().collect::<Vec<_>>();
    groups.sort_by(|(a, _), (b, _)| compare_keys(a.as_deref(), b.as_deref()));

    let geoms = layer.geoms();
    let shapes = groups.iter()
        .map(|(key, indices)| {
            log::debug!("[dissolve] {key:?}: union of {} polygons", indices.len());
            geoms.union_of(indices)
        })
        .collect::<Vec<_>>();
    let keys = groups.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let aggregate = AcAggregate::from_layer(layer, group_column)?;
    let rows = keys.iter()
        .map(|key| aggregate.position(key.as_deref()))
        .collect::<Vec<_>>();

    let data = stats_frame(
        group_column,
        aggregate.schema(),
        aggregate.demographics(),
        keys.iter().zip(&rows)
            .map(|(key, row)| (key.clone(), row.map(|r| &aggregate.stats()[r])))
            .collect(),
    )?;

    log::info!("[dissolve] {} village polygons into {} constituencies", layer.len(), keys.len());

    Ok(AcLayer {
        geoms: Geometries::new(shapes, geoms.epsg()),
        keys,
        rows,
        aggregate,
        data,
    })
}
