//! Region-key canonicalisation shared by the shapefile and sheet loaders.

/// Canonicalise a region code so shapefile ids and sheet keys compare equal
/// despite formatting drift: trims, turns non-breaking spaces into spaces,
/// collapses whitespace runs and upper-cases.
///
/// Only missing input maps to `None`; blank input becomes the empty key.
pub fn normalize_key(value: Option<&str>) -> Option<String> {
    let value = value?.replace('\u{00A0}', " ");
    Some(value.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase())
}

/// Render a numeric shapefile id the way it is written in sheets (`123.0` -> `"123"`).
pub(crate) fn numeric_key(value: f64) -> Option<String> {
    if !value.is_finite() { return None }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(format!("{}", value as i64))
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_collapse_to_one_key() {
        let variants = ["  léft\u{00A0}pad  ", "LÉFT PAD", "léft   pad", "\tLéft\u{00A0}\u{00A0}Pad\n"];
        for v in variants {
            assert_eq!(normalize_key(Some(v)).as_deref(), Some("LÉFT PAD"), "variant {v:?}");
        }
    }

    #[test]
    fn normalising_twice_changes_nothing() {
        for v in ["a1 ", " 0123 ", "x\u{00A0} y", "Already Fine"] {
            let once = normalize_key(Some(v));
            assert_eq!(normalize_key(once.as_deref()), once);
        }
    }

    #[test]
    fn only_missing_is_none() {
        assert_eq!(normalize_key(None), None);
        assert_eq!(normalize_key(Some("   ")).as_deref(), Some(""));
        assert_eq!(normalize_key(Some("\u{00A0}")).as_deref(), Some(""));
        assert_eq!(normalize_key(Some("")).as_deref(), Some(""));
    }

    #[test]
    fn leading_zeros_survive() {
        assert_eq!(normalize_key(Some("007")).as_deref(), Some("007"));
    }

    #[test]
    fn numeric_ids_drop_trailing_zero() {
        assert_eq!(numeric_key(123.0).as_deref(), Some("123"));
        assert_eq!(numeric_key(12.5).as_deref(), Some("12.5"));
        assert_eq!(numeric_key(f64::NAN), None);
    }
}
