//! IO module for format-specific reading and writing operations.
//!
//! Each format module handles reading and/or writing for one file format.
//!
//! - `csv` - sheet CSVs (read as text) and summary tables
//! - `shp` - village shapefiles and their attribute records
//! - `prj` - `.prj` sidecars, mapped to EPSG codes
//! - `geojson` - feature collections for map documents
//! - `svg` - static map imagery
//! - `download` - fetching published sheets over HTTP (requires `download` feature)

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod prj;
pub(crate) mod shp;
pub(crate) mod svg;

#[cfg(feature = "download")]
pub(crate) mod download;

pub use geojson::multipolygon_to_geojson;
