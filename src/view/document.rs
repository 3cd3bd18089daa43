use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::{
    ac::dissolve,
    config::MapSettings,
    error::Outcome,
    io::geojson::feature_collection,
    map::VillageLayer,
};
use super::{
    fit_viewport, tooltip::row_properties, FeatureLayer, Highlight, LayerStyle, MapLevel,
    TooltipSpec, ViewState, Viewport,
};

/// A self-contained description of one map layer for a web map client.
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub name: String,
    pub tiles: String,
    pub style: LayerStyle,
    pub highlight: Highlight,
    pub tooltip: TooltipSpec,
    pub viewport: Viewport,
    /// GeoJSON FeatureCollection; every feature carries every tooltip field.
    pub features: Value,
}

impl MapDocument {
    pub fn build(layer: &impl FeatureLayer, settings: &MapSettings) -> Result<Outcome<Self>> {
        let tooltip = layer.tooltip();
        let mut data = layer.data().clone();
        tooltip.ensure_columns(&mut data)?;

        let features = feature_collection(layer.geoms().shapes(), row_properties(&data)?)?;
        let style = layer.style();

        Ok(fit_viewport(layer.geoms(), settings).map(|viewport| Self {
            name: layer.name().to_string(),
            tiles: settings.tiles.clone(),
            highlight: style.highlight.clone(),
            style,
            tooltip,
            viewport,
            features,
        }))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("[document] Failed to serialise map document")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("[document] Failed to write {}", path.display()))
    }
}

/// Build the document `state` asks for, dissolving constituencies when needed.
pub fn render(state: &ViewState, villages: &VillageLayer, settings: &MapSettings) -> Result<Outcome<MapDocument>> {
    match state.level {
        MapLevel::Village => MapDocument::build(villages, settings),
        MapLevel::AssemblyConstituency => {
            let acs = dissolve(villages, state.group_column(villages.schema()))?;
            MapDocument::build(&acs, settings)
        }
    }
}
