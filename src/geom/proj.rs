use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::geom::Geometries;

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Sphere radius of EPSG:3857 (Web/Pseudo Mercator).
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Whether `epsg` is plain WGS84 longitude/latitude.
#[inline]
pub(crate) fn is_wgs84(epsg: u32) -> bool { epsg == 4326 }

/// Whether coordinates in `epsg` are degrees (proj4rs wants radians for those).
#[inline]
fn is_geographic(epsg: u32) -> bool { matches!(epsg, 4326 | 4269 | 4937) }

/// Inverse spherical Mercator, exact for EPSG:3857 without a datum shift.
#[inline]
fn web_mercator_to_lonlat(coord: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (coord.x / WEB_MERCATOR_RADIUS).to_degrees(),
        y: (coord.y / WEB_MERCATOR_RADIUS).sinh().atan().to_degrees(),
    }
}

/// PROJ.4 definition for the EPSG codes village shapefiles are commonly delivered in.
pub(crate) fn proj4_for_epsg(epsg: u32) -> Option<String> {
    match epsg {
        4326 => Some(WGS84_PROJ4.to_string()),
        4269 | 4937 => Some("+proj=longlat +datum=NAD83 +no_defs +type=crs".to_string()),
        // WGS84 / UTM north and south
        32601..=32660 => Some(format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs +type=crs", epsg - 32600)),
        32701..=32760 => Some(format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs +type=crs", epsg - 32700)),
        _ => None,
    }
}

impl Geometries {
    /// Reproject every shape to WGS84 lon/lat (EPSG:4326).
    pub fn reproject_to_wgs84(&self) -> Result<Geometries> {
        let source = self.epsg()
            .ok_or_else(|| anyhow!("[geom::proj] source CRS is unknown"))?;
        if is_wgs84(source) { return Ok(self.clone()) }
        if source == 3857 {
            let projected = self.shapes().iter()
                .map(|shape| shape.map_coords(web_mercator_to_lonlat))
                .collect();
            return Ok(Geometries::new(projected, Some(4326)))
        }

        let from = {
            let proj_string = proj4_for_epsg(source)
                .ok_or_else(|| anyhow!("[geom::proj] no PROJ.4 definition for EPSG:{source}"))?;
            Proj4::from_proj_string(&proj_string)
                .map_err(|e| anyhow!("{e:?}"))
                .with_context(|| format!("[geom::proj] failed to build source PROJ.4: {proj_string}"))?
        };

        let to = Proj4::from_proj_string(WGS84_PROJ4)
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("[geom::proj] failed to build target PROJ.4: {WGS84_PROJ4}"))?;

        let geographic = is_geographic(source);

        // Degrees or metres in, radians out.
        let projected = self.shapes().iter()
            .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
                let mut point = if geographic {
                    (coord.x.to_radians(), coord.y.to_radians(), 0.0)
                } else {
                    (coord.x, coord.y, 0.0)
                };
                transform(&from, &to, &mut point)
                    .map_err(|e| anyhow!("[geom::proj] transform of ({}, {}) failed: {e:?}", coord.x, coord.y))?;
                let (lon, lat) = (point.0.to_degrees(), point.1.to_degrees());
                if !lon.is_finite() || !lat.is_finite() {
                    bail!("[geom::proj] transform of ({}, {}) is not finite", coord.x, coord.y);
                }
                Ok(Coord { x: lon, y: lat })
            }))
            .collect::<Result<Vec<MultiPolygon<f64>>>>()?;

        Ok(Geometries::new(projected, Some(4326)))
    }
}
