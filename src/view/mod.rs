//! Everything a map front end needs from the core: layer styles, tooltip
//! specifications, viewport fitting, GeoJSON documents, hover lookup, static
//! SVG images and summary tables.

mod document;
mod hover;
mod state;
mod style;
mod summary;
mod svg;
mod tooltip;
mod viewport;

use polars::frame::DataFrame;

use crate::{ac::AcLayer, geom::Geometries, map::VillageLayer};

pub use document::{render, MapDocument};
pub use hover::feature_at;
pub use state::{MapLevel, ViewState};
pub use style::{Highlight, LayerStyle};
pub use summary::{ac_summary, summary_table, summary_to_csv, village_summary, write_summary};
pub use svg::{render_svg, render_svg_with_size, svg_string};
pub use tooltip::TooltipSpec;
pub use viewport::{fit_viewport, Viewport};

/// A polygon layer that can be drawn: shapes with index-aligned attributes.
pub trait FeatureLayer {
    /// Layer name shown in layer controls.
    fn name(&self) -> &'static str;
    fn geoms(&self) -> &Geometries;
    fn data(&self) -> &DataFrame;
    fn tooltip(&self) -> TooltipSpec;
    fn style(&self) -> LayerStyle;
}

impl FeatureLayer for VillageLayer {
    fn name(&self) -> &'static str { "Villages" }

    fn geoms(&self) -> &Geometries { VillageLayer::geoms(self) }

    fn data(&self) -> &DataFrame { VillageLayer::data(self) }

    fn tooltip(&self) -> TooltipSpec { TooltipSpec::village(self.schema(), self.demographics()) }

    fn style(&self) -> LayerStyle { LayerStyle::village() }
}

impl FeatureLayer for AcLayer {
    fn name(&self) -> &'static str { "AC (dissolved)" }

    fn geoms(&self) -> &Geometries { AcLayer::geoms(self) }

    fn data(&self) -> &DataFrame { AcLayer::data(self) }

    fn tooltip(&self) -> TooltipSpec {
        let aggregate = self.aggregate();
        TooltipSpec::ac(self.group_column(), aggregate.schema(), aggregate.demographics())
    }

    fn style(&self) -> LayerStyle { LayerStyle::ac() }
}
