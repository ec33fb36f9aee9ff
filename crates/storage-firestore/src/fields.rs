//! Conversion between JSON documents and Firestore typed values.
//!
//! The REST API represents every field as a single-key object naming
//! its type (`{"stringValue": "x"}`). Core code works with plain JSON;
//! these functions translate at the wire boundary.

use serde_json::{json, Map, Value};

use reliefmap_core::store::Document;

use crate::errors::StorageError;

/// Encodes a document's fields into the REST `fields` map.
pub fn encode_fields(fields: &Document) -> Result<Map<String, Value>, StorageError> {
    let mut encoded = Map::with_capacity(fields.len());
    for (name, value) in fields {
        encoded.insert(name.clone(), encode_value(value)?);
    }
    Ok(encoded)
}

/// Decodes a REST `fields` map into a document.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Document, StorageError> {
    let mut decoded = Document::with_capacity(fields.len());
    for (name, value) in fields {
        decoded.insert(name.clone(), decode_value(value)?);
    }
    Ok(decoded)
}

fn encode_value(value: &Value) -> Result<Value, StorageError> {
    Ok(match value {
        Value::Null => json!({"nullValue": null}),
        Value::Bool(b) => json!({"booleanValue": b}),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Integers travel as strings on the wire.
                json!({"integerValue": i.to_string()})
            } else {
                json!({"doubleValue": n.as_f64()})
            }
        }
        Value::String(s) => json!({"stringValue": s}),
        Value::Array(items) => {
            let values = items
                .iter()
                .map(encode_value)
                .collect::<Result<Vec<_>, _>>()?;
            json!({"arrayValue": {"values": values}})
        }
        Value::Object(map) => {
            if let Some(geo_point) = as_geo_point(map) {
                json!({"geoPointValue": geo_point})
            } else {
                json!({"mapValue": {"fields": encode_fields(map)?}})
            }
        }
    })
}

/// Objects with exactly a numeric `latitude` and `longitude` are the
/// JSON form of the store's geo-point type (region geometry, score
/// bounds) and get its native encoding.
fn as_geo_point(map: &Map<String, Value>) -> Option<Value> {
    if map.len() != 2 {
        return None;
    }
    let latitude = map.get("latitude")?.as_f64()?;
    let longitude = map.get("longitude")?.as_f64()?;
    Some(json!({"latitude": latitude, "longitude": longitude}))
}

fn decode_value(value: &Value) -> Result<Value, StorageError> {
    let object = value
        .as_object()
        .ok_or_else(|| StorageError::Value(format!("expected a typed value, got {value}")))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| StorageError::Value("empty typed value".to_string()))?;
    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.clone(),
        "integerValue" => {
            let raw = inner
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| inner.to_string());
            let parsed: i64 = raw
                .parse()
                .map_err(|_| StorageError::Value(format!("bad integer value: {raw}")))?;
            json!(parsed)
        }
        "doubleValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            Value::Array(
                values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Value::Object(decode_fields(&fields)?)
        }
        other => {
            return Err(StorageError::Value(format!(
                "unsupported value type: {other}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_scalars_round_trip() {
        let fields = document(json!({
            "name": "harvey",
            "year": 2017,
            "threshold": 0.3,
            "archived": false,
            "damage_asset_path": null,
        }));
        let encoded = encode_fields(&fields).unwrap();
        assert_eq!(encoded["year"], json!({"integerValue": "2017"}));
        assert_eq!(encoded["threshold"], json!({"doubleValue": 0.3}));
        assert_eq!(encoded["name"], json!({"stringValue": "harvey"}));

        let decoded = decode_fields(&encoded).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_nested_arrays_and_maps_round_trip() {
        let fields = document(json!({
            "layers": [
                {"display-name": "FEMA damage", "asset-type": 1, "display-on-load": true},
                {"display-name": "SNAP", "asset-type": 0, "display-on-load": false},
            ],
            "snap_data": {"paths": {"TX": "users/gd/states/TX/snap"}},
        }));
        let encoded = encode_fields(&fields).unwrap();
        let decoded = decode_fields(&encoded).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_geo_points_use_the_native_encoding() {
        let fields = document(json!({
            "geometry": [
                {"latitude": 29.7, "longitude": -95.4},
                {"latitude": 29.8, "longitude": -95.3},
            ],
        }));
        let encoded = encode_fields(&fields).unwrap();
        assert_eq!(
            encoded["geometry"]["arrayValue"]["values"][0],
            json!({"geoPointValue": {"latitude": 29.7, "longitude": -95.4}})
        );
        let decoded = decode_fields(&encoded).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_lookalike_maps_are_not_geo_points() {
        // A third key disqualifies the geo-point encoding.
        let fields = document(json!({
            "point": {"latitude": 1.0, "longitude": 2.0, "altitude": 3.0},
        }));
        let encoded = encode_fields(&fields).unwrap();
        assert!(encoded["point"].get("mapValue").is_some());
    }

    #[test]
    fn test_unknown_value_types_are_rejected() {
        let fields: Map<String, Value> =
            document(json!({"bad": {"quaternionValue": [0, 0, 0, 1]}}));
        assert!(decode_fields(&fields).is_err());
    }

    #[test]
    fn test_integer_values_must_parse() {
        let fields = document(json!({"n": {"integerValue": "twelve"}}));
        assert!(decode_fields(&fields).is_err());
    }
}
