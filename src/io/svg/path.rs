//! Polygon outlines as SVG path data.

use geo::{Coord, CoordsIter, LineString, MultiPolygon, Rect};

/// Projection function: lon/lat -> SVG coords (x,y)
pub(crate) type Projection<'a> = dyn Fn(&Coord<f64>) -> (f64, f64) + 'a;

/// Frame mapping `bounds` into a `width`-wide canvas with a margin, Y down.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) margin: f64,
    pub(crate) scale: f64,
    pub(crate) bounds: Rect<f64>,
}

impl Frame {
    pub(crate) fn fit(bounds: Rect<f64>, width: f64, margin: f64) -> Self {
        let span = bounds.width().max(bounds.height());
        let scale = if span > 0.0 { (width - 2.0 * margin) / span } else { 1.0 };
        let height = bounds.height() * scale + 2.0 * margin;
        Self { width, height, margin, scale, bounds }
    }

    pub(crate) fn project(&self, coord: &Coord<f64>) -> (f64, f64) {
        let x = self.margin + (coord.x - self.bounds.min().x) * self.scale;
        let y = self.margin + (self.bounds.max().y - coord.y) * self.scale; // invert vertically
        (x, y)
    }
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection<'_>) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }

    out
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection<'_>) -> String {
    let mut out = String::new();

    let mut coords = ring.coords_iter()
        .map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }

    out
}
