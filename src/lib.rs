#![doc = "Village and assembly-constituency vote-share maps"]
mod ac;
mod cache;
mod config;
mod error;
mod geom;
mod io;
mod key;
mod map;
mod view;

#[doc(inline)]
pub use ac::{aggregate, dissolve, round2, weighted_column, AcAggregate, AcLayer, AcStats};

#[doc(inline)]
pub use cache::LoadCache;

#[doc(inline)]
pub use config::{Config, MapSettings, Party, Schema};

#[doc(inline)]
pub use error::{LoadError, MergeError, Outcome, Warning};

#[doc(inline)]
pub use geom::Geometries;

#[doc(inline)]
pub use io::multipolygon_to_geojson;

#[doc(inline)]
pub use key::normalize_key;

#[doc(inline)]
pub use map::{
    load_layer, load_shapes, load_sheet, merge, JoinCardinality, SheetSource, VillageLayer,
    VillageShapes, VillageSheet,
};

#[cfg(feature = "download")]
#[doc(inline)]
pub use map::fetch_sheet;

#[doc(inline)]
pub use view::{
    ac_summary, feature_at, fit_viewport, render, render_svg, render_svg_with_size, summary_table,
    summary_to_csv, svg_string, village_summary, write_summary, FeatureLayer, Highlight,
    LayerStyle, MapDocument, MapLevel, TooltipSpec, ViewState, Viewport,
};

/// Shapefile summary: record count, geometry mix and attribute columns.
pub fn describe_shapefile(path: &std::path::Path) -> anyhow::Result<String> {
    Ok(io::shp::describe_shapefile(&io::shp::read_shapefile(path)?))
}
