//! User-drawn region domain models.

use serde::{Deserialize, Serialize};

use crate::store::GeoPoint;

/// Data computed for a region by the analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatedData {
    /// Damage points inside the region.
    pub damage: i64,
}

/// A user-drawn feature and its notes, as stored in the user-shapes
/// collection. A single-point geometry is a marker; markers carry no
/// calculated data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserRegion {
    #[serde(default)]
    pub geometry: Vec<GeoPoint>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_data: Option<CalculatedData>,
}

impl UserRegion {
    pub fn new(geometry: Vec<GeoPoint>, notes: impl Into<String>) -> Self {
        Self {
            geometry,
            notes: notes.into(),
            calculated_data: None,
        }
    }

    /// Whether this is a point marker rather than a polygon.
    pub fn is_marker(&self) -> bool {
        self.geometry.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trips_with_stored_field_names() {
        let region = UserRegion {
            geometry: vec![
                GeoPoint::new(29.7, -95.4),
                GeoPoint::new(29.8, -95.4),
                GeoPoint::new(29.8, -95.3),
            ],
            notes: "roof damage".to_string(),
            calculated_data: Some(CalculatedData { damage: 12 }),
        };
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["calculatedData"]["damage"], json!(12));
        assert_eq!(value["geometry"][0]["latitude"], json!(29.7));

        let parsed: UserRegion = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, region);
    }

    #[test]
    fn test_marker_detection() {
        assert!(UserRegion::new(vec![GeoPoint::new(29.7, -95.4)], "").is_marker());
        assert!(!UserRegion::new(
            vec![GeoPoint::new(29.7, -95.4), GeoPoint::new(29.8, -95.3)],
            ""
        )
        .is_marker());
    }
}
