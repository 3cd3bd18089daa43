use serde::Serialize;

use crate::{config::MapSettings, error::{Outcome, Warning}, geom::Geometries};

/// Initial map view: `bounds` as `[[south, west], [north, east]]` when fitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub bounds: Option<[[f64; 2]; 2]>,
}

impl Viewport {
    pub fn default_for(settings: &MapSettings) -> Self {
        Self { center: settings.center, zoom: settings.zoom, bounds: None }
    }
}

/// Fit the view to the extent of `geoms`, falling back to the configured
/// center and zoom when the extent is empty or not in lon/lat.
pub fn fit_viewport(geoms: &Geometries, settings: &MapSettings) -> Outcome<Viewport> {
    let fallback = |reason: &str| Outcome::with_warnings(
        Viewport::default_for(settings),
        vec![Warning::ViewportFit { reason: reason.to_string() }],
    );

    let Some(rect) = geoms.bounds() else { return fallback("no geometry") };
    let (min, max) = (rect.min(), rect.max());

    if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
        return fallback("bounds are not finite")
    }
    if min.x < -180.0 || max.x > 180.0 || min.y < -90.0 || max.y > 90.0 {
        return fallback("bounds are not longitude/latitude")
    }

    Outcome::ok(Viewport {
        center: [(min.y + max.y) / 2.0, (min.x + max.x) / 2.0],
        zoom: settings.zoom,
        bounds: Some([[min.y, min.x], [max.y, max.x]]),
    })
}
