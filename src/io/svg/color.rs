//! Fill colours for choropleth output.

use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill for polygons without a value.
pub(crate) const MISSING: Rgb = Rgb { r: 0xcc, g: 0xcc, b: 0xcc };

const LIGHT: Rgb = Rgb { r: 0xde, g: 0xeb, b: 0xf7 };
const DARK: Rgb = Rgb { r: 0x08, g: 0x51, b: 0x9c };

/// Sequential light-to-dark blue ramp for `t` in [0.0, 1.0].
pub(crate) fn sequential_color(t: f64) -> Rgb {
    if !t.is_finite() { return MISSING }
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgb { r: lerp(LIGHT.r, DARK.r), g: lerp(LIGHT.g, DARK.g), b: lerp(LIGHT.b, DARK.b) }
}

/// One fill per value, scaled between the smallest and largest present value.
pub(crate) fn choropleth_colors(values: &[Option<f64>]) -> Vec<Rgb> {
    let present = values.iter().flatten().copied().filter(|v| v.is_finite());
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = if max > min { max - min } else { 1.0 };

    values.iter()
        .map(|value| match value {
            Some(v) if v.is_finite() => sequential_color((v - min) / range),
            _ => MISSING,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_ends_and_hex_format() {
        assert_eq!(sequential_color(0.0), LIGHT);
        assert_eq!(sequential_color(1.0), DARK);
        assert_eq!(sequential_color(2.0), DARK);
        assert_eq!(DARK.to_string(), "#08519c");
    }

    #[test]
    fn missing_values_are_grey() {
        let colors = choropleth_colors(&[Some(10.0), None, Some(30.0), Some(f64::NAN)]);
        assert_eq!(colors, vec![LIGHT, MISSING, DARK, MISSING]);
    }

    #[test]
    fn constant_values_use_the_light_end() {
        assert_eq!(choropleth_colors(&[Some(5.0), Some(5.0)]), vec![LIGHT, LIGHT]);
    }
}
