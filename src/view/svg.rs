use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{anyhow, Context, Result};

use crate::io::svg::{
    choropleth_colors, draw_filled, write_svg_footer, write_svg_header, write_svg_styles, Frame, Stroke,
};
use super::FeatureLayer;

/// Small wrapper with defaults.
pub fn render_svg(layer: &impl FeatureLayer, field: &str, path: &Path) -> Result<()> {
    render_svg_with_size(layer, field, path, 1200, 10)
}

/// Write a choropleth of `field` to an SVG file.
pub fn render_svg_with_size(layer: &impl FeatureLayer, field: &str, path: &Path, width: u32, margin: u32) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[to_svg] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_choropleth(&mut writer, layer, field, width as f64, margin as f64)?;
    writer.flush()?;
    Ok(())
}

/// Choropleth of `field` as an SVG string.
pub fn svg_string(layer: &impl FeatureLayer, field: &str) -> Result<String> {
    let mut buffer = Vec::new();
    write_choropleth(&mut buffer, layer, field, 1200.0, 10.0)?;
    String::from_utf8(buffer).context("[to_svg] SVG output is not valid UTF-8")
}

/// Polygons coloured by `field` on a sequential ramp; missing values grey.
/// Each polygon is titled with its first tooltip field and its value.
fn write_choropleth<W: Write>(writer: &mut W, layer: &impl FeatureLayer, field: &str, width: f64, margin: f64) -> Result<()> {
    let geoms = layer.geoms();
    let bounds = geoms.bounds()
        .ok_or_else(|| anyhow!("[to_svg] Could not determine bounds; nothing to draw."))?;
    let frame = Frame::fit(bounds, width, margin);

    let data = layer.data();
    let values = match data.get_column_index(field) {
        Some(_) => crate::map::numeric_values(data.column(field)?)?.into_iter().collect::<Vec<_>>(),
        None => {
            log::warn!("[to_svg] no column {field:?}; every polygon drawn as missing");
            vec![None; geoms.len()]
        }
    };

    let tooltip = layer.tooltip();
    let names = match tooltip.fields.first().filter(|f| data.get_column_index(f).is_some()) {
        Some(name) => crate::map::text_values(data.column(name)?)?,
        None => vec![None; geoms.len()],
    };
    let labels = names.iter().zip(&values)
        .map(|(name, value)| format!(
            "{}: {}",
            name.as_deref().unwrap_or("(none)"),
            value.map_or("n/a".to_string(), |v| format!("{v:.2}")),
        ))
        .collect::<Vec<_>>();

    let style = layer.style();
    let stroke = Stroke { color: &style.color, width: style.weight, fill_opacity: style.fill_opacity.max(0.85) };

    write_svg_header(writer, &frame)?;
    write_svg_styles(writer, &stroke)?;
    draw_filled(writer, geoms.shapes(), &choropleth_colors(&values), &labels, &frame)?;
    write_svg_footer(writer)?;
    Ok(())
}
