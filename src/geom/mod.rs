mod geom;
mod proj;

pub use geom::Geometries;
pub(crate) use proj::is_wgs84;
