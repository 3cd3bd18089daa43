use anyhow::{ensure, Result};
use geo::{LineString, MultiPolygon};
use serde_json::{json, Map, Value};

fn ring_to_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// GeoJSON `MultiPolygon` geometry; each polygon is `[exterior, hole, ...]`.
pub fn multipolygon_to_geojson(shape: &MultiPolygon<f64>) -> Value {
    let polygons = shape.0.iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(ring_to_coords)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

/// FeatureCollection pairing each shape with its property map.
pub(crate) fn feature_collection(shapes: &[MultiPolygon<f64>], properties: Vec<Map<String, Value>>) -> Result<Value> {
    ensure!(
        shapes.len() == properties.len(),
        "[io::geojson] {} shapes but {} property rows", shapes.len(), properties.len()
    );

    let features = shapes.iter().zip(properties)
        .map(|(shape, properties)| json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(shape),
            "properties": properties,
        }))
        .collect::<Vec<_>>();

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    #[test]
    fn holes_follow_their_exterior() {
        let square = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)])],
        );
        let value = multipolygon_to_geojson(&MultiPolygon(vec![square]));
        assert_eq!(value["type"], "MultiPolygon");
        let rings = value["coordinates"][0].as_array().unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0][2], json!([4.0, 4.0]));
        assert_eq!(rings[1].as_array().unwrap().len(), 4);
    }

    #[test]
    fn collection_keeps_properties_in_order() {
        let shape = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)]]);
        let mut props = Map::new();
        props.insert("AC_name".into(), Value::Null);
        let value = feature_collection(&[shape], vec![props]).unwrap();
        assert_eq!(value["features"][0]["properties"]["AC_name"], Value::Null);
        assert!(feature_collection(&[], vec![Map::new()]).is_err());
    }
}
