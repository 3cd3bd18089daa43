mod layer;
mod merge;
mod shapes;
mod sheet;

use anyhow::Result;

use crate::{config::Config, error::Outcome};

pub use layer::{JoinCardinality, VillageLayer};
pub use merge::merge;
pub use shapes::{load_shapes, VillageShapes};
pub use sheet::{load_sheet, SheetSource, VillageSheet};
#[cfg(feature = "download")]
pub use sheet::fetch_sheet;

pub(crate) use sheet::{numeric_values, text_values};

/// Load both inputs named by `config` and merge them.
pub fn load_layer(config: &Config) -> Result<Outcome<VillageLayer>> {
    let shapes = load_shapes(&config.shapefile, &config.shapefile_key)?;
    let sheet = load_sheet(&SheetSource::parse(&config.sheet), &config.schema)?;
    let mut warnings = shapes.warnings;
    let merged = merge(shapes.value, &sheet)?;
    warnings.extend(merged.warnings);
    Ok(Outcome::with_warnings(merged.value, warnings))
}
