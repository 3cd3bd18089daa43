use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;

use crate::{
    error::{LoadError, Outcome, Warning},
    geom::{is_wgs84, Geometries},
    io::{prj, shp},
    key::normalize_key,
};

/// Village polygons with their normalised region keys, index-aligned.
#[derive(Debug, Clone)]
pub struct VillageShapes {
    geoms: Geometries,
    keys: Vec<Option<String>>,
}

impl VillageShapes {
    /// Build from raw parts: keys are normalised, and shapes are reprojected to
    /// EPSG:4326 when `epsg` says they are in another system.
    ///
    /// Reprojection is best-effort: on failure the shapes are kept as given and
    /// a warning is returned alongside.
    pub fn from_parts(shapes: Vec<MultiPolygon<f64>>, keys: Vec<Option<String>>, epsg: Option<u32>) -> Result<Outcome<Self>> {
        anyhow::ensure!(
            shapes.len() == keys.len(),
            "[load_shapes] {} shapes but {} keys", shapes.len(), keys.len()
        );

        let mut warnings = Vec::new();

        let null_count = shapes.iter().filter(|shape| shape.0.is_empty()).count();
        if null_count > 0 {
            warnings.push(Warning::NullGeometry { count: null_count });
        }

        let raw = Geometries::new(shapes, epsg);
        let geoms = match epsg {
            Some(code) if is_wgs84(code) => raw,
            Some(code) => match raw.reproject_to_wgs84() {
                Ok(projected) => projected,
                Err(e) => {
                    warnings.push(Warning::Reprojection { from: code, reason: format!("{e:#}") });
                    raw
                }
            },
            None => {
                warnings.push(Warning::UnknownCrs { reason: "no readable .prj".to_string() });
                raw
            }
        };

        let keys = keys.iter().map(|key| normalize_key(key.as_deref())).collect();

        Ok(Outcome::with_warnings(Self { geoms, keys }, warnings))
    }

    #[inline] pub fn len(&self) -> usize { self.keys.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    /// Normalised region keys, one per shape.
    #[inline] pub fn keys(&self) -> &[Option<String>] { &self.keys }

    pub(crate) fn into_parts(self) -> (Geometries, Vec<Option<String>>) { (self.geoms, self.keys) }
}

/// Load village polygons from a `.shp`, keyed by `key_field`.
pub fn load_shapes(path: &Path, key_field: &str) -> Result<Outcome<VillageShapes>> {
    log::info!("[load_shapes] reading {}", path.display());
    let items = shp::read_shapefile(path)?;

    if let Some((_, record)) = items.first() {
        if record.get(key_field).is_none() {
            return Err(LoadError::MissingKeyField {
                field: key_field.to_string(),
                path: path.display().to_string(),
            }.into())
        }
    }

    let (shapes, keys): (Vec<_>, Vec<_>) = items.into_iter()
        .enumerate()
        .map(|(i, (shape, record))| -> Result<_> {
            let key = shp::field_as_text(&record, key_field);
            Ok((shp::shape_to_multipolygon(shape, i)?, key))
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("[load_shapes] Error converting shapes in {}", path.display()))?
        .into_iter()
        .unzip();

    let epsg = match prj::read_prj(path)? {
        Some(wkt) => {
            let code = prj::epsg_from_wkt(&wkt);
            if code.is_none() { log::debug!("[load_shapes] unrecognised .prj: {wkt}") }
            code
        }
        None => None,
    };
    log::info!("[load_shapes] {} shapes, EPSG {:?}", shapes.len(), epsg);

    VillageShapes::from_parts(shapes, keys, epsg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn tri(x: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x, y: 1.0), (x: x, y: 0.0)]])
    }

    #[test]
    fn keys_are_normalised() {
        let outcome = VillageShapes::from_parts(
            vec![tri(0.0), tri(1.0)],
            vec![Some(" a1\u{00A0}x ".to_string()), None],
            Some(4326),
        ).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.value.keys(), &[Some("A1 X".to_string()), None]);
    }

    #[test]
    fn unknown_crs_warns_and_keeps_shapes() {
        let outcome = VillageShapes::from_parts(vec![tri(0.0)], vec![Some("1".into())], None).unwrap();
        assert!(matches!(outcome.warnings.as_slice(), [Warning::UnknownCrs { .. }]));
        assert_eq!(outcome.value.geoms().shapes()[0], tri(0.0));
    }

    #[test]
    fn failed_reprojection_warns_and_keeps_shapes() {
        let outcome = VillageShapes::from_parts(vec![tri(0.0)], vec![Some("1".into())], Some(2000)).unwrap();
        assert!(matches!(outcome.warnings.as_slice(), [Warning::Reprojection { from: 2000, .. }]));
        assert_eq!(outcome.value.geoms().epsg(), Some(2000));
        assert_eq!(outcome.value.geoms().shapes()[0], tri(0.0));
    }

    #[test]
    fn null_geometry_is_reported() {
        let outcome = VillageShapes::from_parts(
            vec![tri(0.0), MultiPolygon(Vec::new())],
            vec![Some("1".into()), Some("2".into())],
            Some(4326),
        ).unwrap();
        assert_eq!(outcome.warnings, vec![Warning::NullGeometry { count: 1 }]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(VillageShapes::from_parts(vec![tri(0.0)], Vec::new(), Some(4326)).is_err());
    }
}
