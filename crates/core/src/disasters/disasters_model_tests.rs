//! Tests for disaster domain models.

use serde_json::json;

use crate::disasters::{AssetData, DisasterMetadata, NewDisaster, SnapData};
use crate::layers::{Layer, LayerType};

#[test]
fn test_validated_id_formats_year_and_name() {
    let new_disaster = NewDisaster {
        year: 2017,
        name: "harvey".to_string(),
        states: vec!["TX".to_string()],
    };
    assert_eq!(new_disaster.validated_id().unwrap(), "2017-harvey");
}

#[test]
fn test_validated_id_rejects_uppercase_and_spaces() {
    for name in ["Harvey", "hurricane harvey", "harvey!", ""] {
        let new_disaster = NewDisaster {
            year: 2017,
            name: name.to_string(),
            states: vec!["TX".to_string()],
        };
        assert!(new_disaster.validated_id().is_err(), "accepted {name:?}");
    }
}

#[test]
fn test_validated_id_rejects_short_years_and_missing_states() {
    let short_year = NewDisaster {
        year: 17,
        name: "harvey".to_string(),
        states: vec!["TX".to_string()],
    };
    assert!(short_year.validated_id().is_err());

    let no_states = NewDisaster {
        year: 2017,
        name: "harvey".to_string(),
        states: vec![],
    };
    assert!(no_states.validated_id().is_err());
}

#[test]
fn test_metadata_deserializes_sparse_documents() {
    // Documents written at creation time have only layers and states.
    let metadata: DisasterMetadata =
        serde_json::from_value(json!({"layers": [], "states": ["TX"]})).unwrap();
    assert_eq!(metadata.states, vec!["TX"]);
    assert!(metadata.asset_data.is_none());

    // A completely empty document still parses.
    let empty: DisasterMetadata = serde_json::from_value(json!({})).unwrap();
    assert!(empty.layers.is_empty());
}

#[test]
fn test_metadata_round_trips_layers() {
    let metadata = DisasterMetadata {
        layers: vec![Layer {
            display_name: "SNAP".to_string(),
            ee_name: Some("users/gd/2017-harvey/snap".to_string()),
            asset_type: LayerType::FeatureCollection,
            display_on_load: false,
            color_function: None,
        }],
        states: vec!["TX".to_string()],
        asset_data: None,
    };
    let value = serde_json::to_value(&metadata).unwrap();
    let parsed: DisasterMetadata = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, metadata);
}

#[test]
fn test_asset_data_defaults_use_census_columns() {
    let asset_data = AssetData::default();
    assert_eq!(asset_data.snap_data.snap_key, "HD01_VD02");
    assert_eq!(asset_data.snap_data.total_key, "HD01_VD01");
    assert_eq!(asset_data.svi_key, "RPL_THEMES");
    assert_eq!(asset_data.income_key, "HD01_VD01");
    assert!(asset_data.damage_asset_path.is_none());
}

#[test]
fn test_asset_data_fills_missing_keys_on_parse() {
    let asset_data: AssetData = serde_json::from_value(json!({
        "damage_asset_path": "users/gd/2017-harvey/fema-damage",
        "snap_data": {"paths": {"TX": "users/gd/states/TX/snap"}}
    }))
    .unwrap();
    assert_eq!(
        asset_data.damage_asset_path.as_deref(),
        Some("users/gd/2017-harvey/fema-damage")
    );
    assert_eq!(
        asset_data.snap_data,
        SnapData {
            paths: [("TX".to_string(), "users/gd/states/TX/snap".to_string())]
                .into_iter()
                .collect(),
            snap_key: "HD01_VD02".to_string(),
            total_key: "HD01_VD01".to_string(),
        }
    );
}
