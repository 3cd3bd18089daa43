use serde::Serialize;

/// Hover emphasis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub weight: f64,
    pub color: String,
}

/// Polygon paint of a layer, with keys as map clients name them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    pub fill_color: String,
    pub color: String,
    pub weight: f64,
    pub fill_opacity: f64,
    #[serde(skip)]
    pub highlight: Highlight,
}

impl LayerStyle {
    /// Light green fill with thin dark outlines.
    pub fn village() -> Self {
        Self {
            fill_color: "#D7F4E3".to_string(),
            color: "#222".to_string(),
            weight: 0.6,
            fill_opacity: 0.55,
            highlight: Highlight { weight: 3.0, color: "#D33".to_string() },
        }
    }

    /// Light blue fill with a heavier navy border.
    pub fn ac() -> Self {
        Self {
            fill_color: "#C8E6FF".to_string(),
            color: "#1B4D8C".to_string(),
            weight: 2.5,
            fill_opacity: 0.35,
            highlight: Highlight { weight: 4.0, color: "#FF4B4B".to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_client_keys() {
        let value = serde_json::to_value(LayerStyle::ac()).unwrap();
        assert_eq!(value["fillColor"], "#C8E6FF");
        assert_eq!(value["fillOpacity"], 0.35);
        assert!(value.get("highlight").is_none());
    }

    #[test]
    fn constituency_border_is_heavier() {
        assert!(LayerStyle::ac().weight > LayerStyle::village().weight);
        assert!(LayerStyle::ac().highlight.weight > LayerStyle::village().highlight.weight);
    }
}
