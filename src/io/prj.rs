//! `.prj` sidecar reading: WKT to EPSG code.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use regex::Regex;

/// Read the `.prj` next to a `.shp`, if there is one.
pub(crate) fn read_prj(shp_path: &Path) -> Result<Option<String>> {
    let prj_path = shp_path.with_extension("prj");
    if !prj_path.exists() { return Ok(None) }
    let wkt = fs::read_to_string(&prj_path)
        .with_context(|| format!("[io::prj] Failed to read {}", prj_path.display()))?;
    Ok(Some(wkt))
}

/// Derive an EPSG code from WKT.
///
/// A top-level `AUTHORITY["EPSG", n]` wins; ESRI-flavoured WKT carries none,
/// so well-known names are recognised instead.
pub(crate) fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    let wkt = wkt.trim();

    // The outermost authority sits right before the final bracket.
    let top_authority = Regex::new(r#"(?i)AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]\s*\]$"#).ok()?;
    if let Some(code) = top_authority.captures(wkt).and_then(|c| c[1].parse().ok()) {
        return Some(code)
    }

    let upper = wkt.to_ascii_uppercase();
    let is_wgs84 = upper.contains("WGS_1984") || upper.contains("WGS 84") || upper.contains("WGS84");
    let is_nad83 = upper.contains("NORTH_AMERICAN_DATUM_1983") || upper.contains("NAD83");

    if upper.starts_with("PROJCS") || upper.starts_with("PROJCRS") {
        if ["PSEUDO_MERCATOR", "PSEUDO-MERCATOR", "WEB_MERCATOR", "MERCATOR_AUXILIARY_SPHERE"]
            .iter().any(|name| upper.contains(name))
        {
            return Some(3857)
        }

        let utm = Regex::new(r"UTM[ _]ZONE[ _](\d{1,2})\s*([NS])").ok()?;
        if let Some(caps) = utm.captures(&upper) {
            let zone = caps[1].parse::<u32>().ok().filter(|z| (1..=60).contains(z))?;
            if is_wgs84 {
                return Some(if &caps[2] == "N" { 32600 + zone } else { 32700 + zone })
            }
        }
        return None
    }

    if upper.starts_with("GEOGCS") || upper.starts_with("GEOGCRS") {
        if is_wgs84 { return Some(4326) }
        if is_nad83 { return Some(4269) }
    }

    None
}
