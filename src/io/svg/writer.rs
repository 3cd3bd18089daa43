//! SVG writing operations.

use std::io::Write;

use anyhow::Result;

use super::{multipolygon_to_path, Frame, Rgb};

/// Stroke settings shared by every polygon of a layer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stroke<'a> {
    pub(crate) color: &'a str,
    pub(crate) width: f64,
    pub(crate) fill_opacity: f64,
}

/// Write the SVG header, including the XML declaration and opening <svg> tag.
pub(crate) fn write_svg_header<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-lon-min="{lon_min}" data-lon-max="{lon_max}"
        data-lat-min="{lat_min}" data-lat-max="{lat_max}"
        data-margin="{margin}" data-scale="{scale}">"##,
        width = frame.width,
        height = frame.height,
        margin = frame.margin,
        scale = frame.scale,
        lon_min = frame.bounds.min().x,
        lon_max = frame.bounds.max().x,
        lat_min = frame.bounds.min().y,
        lat_max = frame.bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

/// Write the polygon class used by every feature.
pub(crate) fn write_svg_styles<W: Write>(writer: &mut W, stroke: &Stroke) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .area {{ stroke: {color}; stroke-width: {width}; fill-opacity: {opacity}; vector-effect: non-scaling-stroke; }}
</style>
</defs>"##,
        color = stroke.color,
        width = stroke.width,
        opacity = stroke.fill_opacity,
    )?;
    Ok(())
}

/// Draw one path per shape, filled with its colour and titled with its label.
pub(crate) fn draw_filled<W: Write>(
    writer: &mut W,
    shapes: &[geo::MultiPolygon<f64>],
    fills: &[Rgb],
    labels: &[String],
    frame: &Frame,
) -> Result<()> {
    anyhow::ensure!(
        fills.len() == shapes.len() && labels.len() == shapes.len(),
        "[io::svg] length mismatch: {} fills, {} labels for {} geometries",
        fills.len(), labels.len(), shapes.len(),
    );

    let project = |coord: &geo::Coord<f64>| frame.project(coord);
    for ((shape, fill), label) in shapes.iter().zip(fills).zip(labels) {
        if shape.0.is_empty() { continue }
        writeln!(
            writer,
            r#"<path class="area" fill="{fill}" d="{}"><title>{}</title></path>"#,
            multipolygon_to_path(shape, &project),
            escape(label),
        )?;
    }
    Ok(())
}

/// Write the closing </svg> tag.
pub(crate) fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}

/// Escape text for XML content.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Coord, MultiPolygon, Rect};

    #[test]
    fn draws_titled_paths_and_skips_empty_shapes() {
        let frame = Frame::fit(Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }), 100.0, 0.0);
        let shapes = vec![
            MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)]]),
            MultiPolygon(Vec::new()),
        ];
        let fills = vec![Rgb { r: 255, g: 0, b: 0 }; 2];
        let labels = vec!["A & B".to_string(), "empty".to_string()];

        let mut out = Vec::new();
        draw_filled(&mut out, &shapes, &fills, &labels, &frame).unwrap();
        let svg = String::from_utf8(out).unwrap();
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains("<title>A &amp; B</title>"));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let frame = Frame::fit(Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }), 100.0, 0.0);
        let mut out = Vec::new();
        assert!(draw_filled(&mut out, &[MultiPolygon(Vec::new())], &[], &[], &frame).is_err());
    }
}
