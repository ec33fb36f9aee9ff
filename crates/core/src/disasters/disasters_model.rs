//! Disaster domain models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::layers::Layer;
use crate::store::GeoPoint;

/// A known disaster: the id of its metadata document plus the states it
/// affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disaster {
    /// `<year>-<name>` identifier, name all lowercase (`2017-harvey`).
    pub id: String,
    pub states: Vec<String>,
}

/// Input for creating a disaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDisaster {
    pub year: u16,
    pub name: String,
    pub states: Vec<String>,
}

impl NewDisaster {
    /// Validates the input and returns the metadata document id.
    pub fn validated_id(&self) -> Result<String> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidInput(
                "disaster name must be lowercase with no spaces or punctuation".to_string(),
            )
            .into());
        }
        if self.year < 1000 {
            return Err(
                ValidationError::InvalidInput("year must be a four-digit number".to_string())
                    .into(),
            );
        }
        if self.states.is_empty() {
            return Err(ValidationError::MissingField("states".to_string()).into());
        }
        Ok(format!("{}-{}", self.year, self.name))
    }
}

/// The full metadata document for one disaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisasterMetadata {
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_data: Option<AssetData>,
}

/// Inputs the score-asset computation needs, stored under the
/// `asset_data` field of a disaster's metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetData {
    #[serde(default)]
    pub damage_asset_path: Option<String>,
    /// Polygon bounding the area scores are computed for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub score_bounds_coordinates: Vec<GeoPoint>,
    #[serde(default)]
    pub block_group_asset_paths: BTreeMap<String, String>,
    #[serde(default)]
    pub snap_data: SnapData,
    #[serde(default)]
    pub svi_asset_paths: BTreeMap<String, String>,
    #[serde(default = "default_svi_key")]
    pub svi_key: String,
    #[serde(default)]
    pub income_asset_paths: BTreeMap<String, String>,
    #[serde(default = "default_income_key")]
    pub income_key: String,
    #[serde(default)]
    pub building_asset_paths: BTreeMap<String, String>,
}

/// SNAP table locations and column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapData {
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
    #[serde(default = "default_snap_key")]
    pub snap_key: String,
    #[serde(default = "default_income_key")]
    pub total_key: String,
}

// Default column names, from Census American FactFinder and CDC tables.
fn default_snap_key() -> String {
    "HD01_VD02".to_string()
}

fn default_income_key() -> String {
    "HD01_VD01".to_string()
}

fn default_svi_key() -> String {
    "RPL_THEMES".to_string()
}

impl Default for SnapData {
    fn default() -> Self {
        Self {
            paths: BTreeMap::new(),
            snap_key: default_snap_key(),
            total_key: default_income_key(),
        }
    }
}

impl Default for AssetData {
    fn default() -> Self {
        Self {
            damage_asset_path: None,
            score_bounds_coordinates: Vec::new(),
            block_group_asset_paths: BTreeMap::new(),
            snap_data: SnapData::default(),
            svi_asset_paths: BTreeMap::new(),
            svi_key: default_svi_key(),
            income_asset_paths: BTreeMap::new(),
            income_key: default_income_key(),
            building_asset_paths: BTreeMap::new(),
        }
    }
}
