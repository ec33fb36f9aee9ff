//! Map layer domain models.
//!
//! Layers are stored as an ordered list inside a disaster's metadata
//! document, with the numeric enum encodings older revisions of the
//! dashboard wrote.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of asset a layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LayerType {
    Feature = 0,
    FeatureCollection = 1,
    Image = 2,
    ImageCollection = 3,
    MapTiles = 4,
    Kml = 5,
}

impl From<LayerType> for u8 {
    fn from(value: LayerType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for LayerType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LayerType::Feature),
            1 => Ok(LayerType::FeatureCollection),
            2 => Ok(LayerType::Image),
            3 => Ok(LayerType::ImageCollection),
            4 => Ok(LayerType::MapTiles),
            5 => Ok(LayerType::Kml),
            other => Err(format!("unknown layer type: {other}")),
        }
    }
}

/// How a feature-collection layer is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ColorStyle {
    Continuous = 0,
    Discrete = 1,
    Single = 2,
}

impl From<ColorStyle> for u8 {
    fn from(value: ColorStyle) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for ColorStyle {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColorStyle::Continuous),
            1 => Ok(ColorStyle::Discrete),
            2 => Ok(ColorStyle::Single),
            other => Err(format!("unknown color style: {other}")),
        }
    }
}

/// Coloring properties of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorFunction {
    pub current_style: ColorStyle,
    /// Property whose value drives continuous or discrete coloring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Base color for continuous and single styles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Property value to color, for the discrete style.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, String>,
}

impl ColorFunction {
    pub fn single(color: &str) -> Self {
        Self {
            current_style: ColorStyle::Single,
            field: None,
            color: Some(color.to_string()),
            colors: BTreeMap::new(),
        }
    }
}

/// One map overlay belonging to a disaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Layer {
    pub display_name: String,
    /// Analysis-backend asset path. Absent for URL-backed layer kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ee_name: Option<String>,
    pub asset_type: LayerType,
    pub display_on_load: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_function: Option<ColorFunction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_type_serializes_as_number() {
        assert_eq!(
            serde_json::to_value(LayerType::FeatureCollection).unwrap(),
            json!(1)
        );
        assert_eq!(
            serde_json::from_value::<LayerType>(json!(4)).unwrap(),
            LayerType::MapTiles
        );
        assert!(serde_json::from_value::<LayerType>(json!(9)).is_err());
    }

    #[test]
    fn test_layer_round_trips_with_stored_field_names() {
        let layer = Layer {
            display_name: "FEMA damage".to_string(),
            ee_name: Some("users/gd/2017-harvey/fema-damage".to_string()),
            asset_type: LayerType::FeatureCollection,
            display_on_load: true,
            color_function: Some(ColorFunction::single("red")),
        };
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["display-name"], json!("FEMA damage"));
        assert_eq!(value["asset-type"], json!(1));
        assert_eq!(value["display-on-load"], json!(true));
        assert_eq!(value["color-function"]["currentStyle"], json!(2));

        let parsed: Layer = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, layer);
    }

    #[test]
    fn test_absent_optional_fields_are_omitted() {
        let layer = Layer {
            display_name: "Building counts".to_string(),
            ee_name: None,
            asset_type: LayerType::MapTiles,
            display_on_load: false,
            color_function: None,
        };
        let value = serde_json::to_value(&layer).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("ee-name"));
        assert!(!object.contains_key("color-function"));
    }
}
