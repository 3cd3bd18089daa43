//! Shapefile reading and shape conversion.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

use crate::{error::LoadError, key::numeric_key};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Shape, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("[io::shp] Error reading shape+record")?;
        items.push((shape, record));
    }
    Ok(items)
}

/// Text form of an attribute value, for use as a join key.
pub(crate) fn field_as_text(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        FieldValue::Character(value) => value.clone(),
        FieldValue::Memo(value) => Some(value.clone()),
        FieldValue::Numeric(value) => value.and_then(numeric_key),
        FieldValue::Float(value) => value.and_then(|v| numeric_key(v as f64)),
        FieldValue::Double(value) => numeric_key(*value),
        FieldValue::Integer(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Coerce a shape into an owned multipolygon; null shapes become empty.
pub(crate) fn shape_to_multipolygon(shape: Shape, index: usize) -> Result<geo::MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => Ok(rings_to_geo(polygon.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonM(polygon) => Ok(rings_to_geo(polygon.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonZ(polygon) => Ok(rings_to_geo(polygon.rings(), |pt| (pt.x, pt.y))),
        Shape::NullShape => Ok(geo::MultiPolygon(Vec::new())),
        other => Err(LoadError::UnsupportedShape {
            shape_type: format!("{:?}", other.shapetype()),
            index,
        }.into()),
    }
}

/// Convert shapefile polygon rings to geo::MultiPolygon<f64>
fn rings_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64)) -> geo::MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    // Shapefiles store each exterior followed by its holes.
    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in rings {
        let mut coords = ring.points().iter()
            .map(|pt| { let (x, y) = xy(pt); geo::Coord { x, y } })
            .collect::<Vec<_>>();
        if coords.len() < 3 { continue }
        ensure_closed(&mut coords);

        // A hole with no exterior before it is promoted to an exterior.
        let is_exterior = matches!(ring, PolygonRing::Outer(_)) || current_exterior.is_none();

        let ls = geo::LineString(coords);
        if is_exterior {
            if let Some(ext) = current_exterior.take() {
                polys.push(geo::Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ls);
        } else {
            current_holes.push(ls);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }

    geo::MultiPolygon(polys)
}

/// Debug summary of shapefile items: record count, geometry mix, attribute columns.
pub(crate) fn describe_shapefile(items: &[(Shape, Record)]) -> String {
    let mut out = format!("Number of records: {}\n", items.len());

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (shape, _) in items {
        let k = match shape {
            Shape::Point(_) | Shape::PointM(_) | Shape::PointZ(_) => "Point",
            Shape::Polygon(_) | Shape::PolygonM(_) | Shape::PolygonZ(_) => "Polygon",
            Shape::NullShape => "Null",
            _ => "Other",
        };
        *counts.entry(k).or_default() += 1;
    }
    out.push_str("Geometry mix:\n");
    for (k, v) in counts {
        out.push_str(&format!("  - {k}: {v}\n"));
    }

    if let Some((_, record)) = items.first() {
        out.push_str("Attribute columns:\n");
        for (field, value) in record.clone() {
            out.push_str(&format!("  - {field} ({value:?})\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use shapefile::Point;

    fn ring(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    #[test]
    fn outer_ring_with_hole() {
        let rings = vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)])),
        ];
        let mp = rings_to_geo(&rings, |pt| (pt.x, pt.y));
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn two_outer_rings_make_two_parts() {
        let rings = vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])),
            PolygonRing::Outer(ring(&[(5.0, 5.0), (5.0, 6.0), (6.0, 6.0), (6.0, 5.0)])),
        ];
        let mp = rings_to_geo(&rings, |pt| (pt.x, pt.y));
        assert_eq!(mp.0.len(), 2);
        // unclosed input rings are closed
        assert_eq!(mp.0[0].exterior().0.first(), mp.0[0].exterior().0.last());
    }

    #[test]
    fn null_shape_is_empty() {
        let mp = shape_to_multipolygon(Shape::NullShape, 0).unwrap();
        assert!(mp.0.is_empty());
    }

    #[test]
    fn points_are_rejected() {
        let err = shape_to_multipolygon(Shape::Point(Point { x: 1.0, y: 2.0 }), 7).unwrap_err();
        assert!(err.to_string().contains("record 7"));
    }
}
