use std::path::{Path, PathBuf};

use anyhow::Result;
use votemap::{
    dissolve, load_layer, render_svg, summary_table, write_summary, FeatureLayer, MapDocument, MapLevel,
};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::RenderArgs) -> Result<()> {
    let config = cli.resolve_config()?;
    let state = args.view.state();

    let villages = load_layer(&config)?.into_logged("load");
    let schema = villages.schema();
    let out_path = args.output.clone().unwrap_or(PathBuf::from("map.json"));

    match state.level {
        MapLevel::Village => {
            let field = args.field.clone()
                .or_else(|| schema.share_columns().first().map(|s| s.to_string()));
            write_outputs(&villages, &config.map, &out_path, args.svg.as_deref(), field)?
        }
        MapLevel::AssemblyConstituency => {
            let acs = dissolve(&villages, state.group_column(schema))?;
            let field = args.field.clone()
                .or_else(|| schema.parties.first().map(|p| p.aggregate_share()));
            write_outputs(&acs, &config.map, &out_path, args.svg.as_deref(), field)?
        }
    }

    if let Some(summary_path) = &args.summary {
        let mut table = summary_table(&state, &villages, config.map.summary_rows)?;
        write_summary(&mut table, summary_path)?;
    }

    Ok(())
}

/// Map document for `layer`, plus an SVG of `field` when asked for.
fn write_outputs(
    layer: &impl FeatureLayer,
    settings: &votemap::MapSettings,
    out_path: &Path,
    svg_path: Option<&Path>,
    field: Option<String>,
) -> Result<()> {
    let document = MapDocument::build(layer, settings)?.into_logged("render");
    document.write(out_path)?;
    log::info!("[render] wrote {} to {}", document.name, out_path.display());

    if let Some(svg_path) = svg_path {
        let field = field.unwrap_or_default();
        render_svg(layer, &field, svg_path)?;
        log::info!("[render] wrote {field:?} choropleth to {}", svg_path.display());
    }
    Ok(())
}
