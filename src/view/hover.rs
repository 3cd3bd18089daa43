use anyhow::Result;
use geo::Point;
use serde_json::Value;

use super::FeatureLayer;

/// Tooltip `(alias, value)` pairs of the polygon under `(lon, lat)`, if any.
///
/// Where polygons overlap, the first in layer order wins.
pub fn feature_at(layer: &impl FeatureLayer, lon: f64, lat: f64) -> Result<Option<Vec<(String, Value)>>> {
    let Some(index) = layer.geoms().locate(Point::new(lon, lat)) else { return Ok(None) };
    log::debug!("[feature_at] ({lon}, {lat}) hits {} feature {index}", layer.name());
    layer.tooltip().row(layer.data(), index).map(Some)
}
