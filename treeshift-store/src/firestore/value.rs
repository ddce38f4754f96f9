//! Conversion between [`FieldValue`] and the Firestore REST value encoding.

use crate::error::{StoreError, StoreResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use treeshift_types::{FieldValue, Fields};

/// Encodes a field map as the `fields` object of a REST document.
pub(crate) fn encode_fields(fields: &Fields) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect();
    Value::Object(map)
}

pub(crate) fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        // 64-bit integers travel as strings.
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": encode_double(*d) }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
        }
        FieldValue::Bytes(bytes) => json!({ "bytesValue": STANDARD.encode(bytes) }),
        FieldValue::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
        FieldValue::GeoPoint {
            latitude,
            longitude,
        } => json!({
            "geoPointValue": {
                "latitude": encode_double(*latitude),
                "longitude": encode_double(*longitude)
            }
        }),
        FieldValue::Reference(name) => json!({ "referenceValue": name }),
    }
}

/// JSON numbers cannot hold NaN or the infinities; those travel as strings.
fn encode_double(d: f64) -> Value {
    if d.is_nan() {
        json!("NaN")
    } else if d == f64::INFINITY {
        json!("Infinity")
    } else if d == f64::NEG_INFINITY {
        json!("-Infinity")
    } else {
        json!(d)
    }
}

fn decode_double(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Decodes the `fields` object of a REST document. A missing object is an
/// empty document.
pub(crate) fn decode_fields(fields: Option<&Value>) -> StoreResult<Fields> {
    let Some(fields) = fields else {
        return Ok(Fields::new());
    };
    let object = fields
        .as_object()
        .ok_or_else(|| StoreError::Decode("fields is not an object".to_string()))?;

    object
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

pub(crate) fn decode_value(value: &Value) -> StoreResult<FieldValue> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("value is not an object: {value}")))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty value object".to_string()))?;

    let decoded = match kind.as_str() {
        "nullValue" => FieldValue::Null,
        "booleanValue" => FieldValue::Boolean(
            inner
                .as_bool()
                .ok_or_else(|| bad_kind(kind, inner))?,
        ),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            FieldValue::Integer(parsed.ok_or_else(|| bad_kind(kind, inner))?)
        }
        "doubleValue" => {
            FieldValue::Double(decode_double(inner).ok_or_else(|| bad_kind(kind, inner))?)
        }
        "stringValue" => FieldValue::String(
            inner
                .as_str()
                .ok_or_else(|| bad_kind(kind, inner))?
                .to_string(),
        ),
        "timestampValue" => {
            let raw = inner.as_str().ok_or_else(|| bad_kind(kind, inner))?;
            let ts = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| StoreError::Decode(format!("bad timestamp {raw:?}: {e}")))?;
            FieldValue::Timestamp(ts.with_timezone(&Utc))
        }
        "bytesValue" => {
            let raw = inner.as_str().ok_or_else(|| bad_kind(kind, inner))?;
            let bytes = STANDARD
                .decode(raw)
                .map_err(|e| StoreError::Decode(format!("bad bytes value: {e}")))?;
            FieldValue::Bytes(bytes)
        }
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<StoreResult<Vec<_>>>()?,
                Some(other) => return Err(bad_kind(kind, other)),
                None => Vec::new(),
            };
            FieldValue::Array(values)
        }
        "mapValue" => FieldValue::Map(decode_fields(inner.get("fields"))?),
        "geoPointValue" => {
            // Zero coordinates are omitted from the wire form.
            let coordinate = |name: &str| match inner.get(name) {
                Some(v) => decode_double(v).ok_or_else(|| bad_kind(kind, inner)),
                None => Ok(0.0),
            };
            if !inner.is_object() {
                return Err(bad_kind(kind, inner));
            }
            FieldValue::GeoPoint {
                latitude: coordinate("latitude")?,
                longitude: coordinate("longitude")?,
            }
        }
        "referenceValue" => FieldValue::Reference(
            inner
                .as_str()
                .ok_or_else(|| bad_kind(kind, inner))?
                .to_string(),
        ),
        other => {
            return Err(StoreError::Decode(format!(
                "unsupported value kind: {other}"
            )));
        }
    };

    Ok(decoded)
}

fn bad_kind(kind: &str, inner: &Value) -> StoreError {
    StoreError::Decode(format!("malformed {kind}: {inner}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integers_are_strings_on_the_wire() {
        assert_eq!(
            encode_value(&FieldValue::Integer(42)),
            json!({ "integerValue": "42" })
        );
        assert_eq!(
            decode_value(&json!({ "integerValue": "42" })).unwrap(),
            FieldValue::Integer(42)
        );
        assert_eq!(
            decode_value(&json!({ "integerValue": 7 })).unwrap(),
            FieldValue::Integer(7)
        );
    }

    #[test]
    fn timestamps_use_zulu_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 22, 8, 30, 0).unwrap();
        let encoded = encode_value(&FieldValue::Timestamp(ts));
        assert_eq!(encoded, json!({ "timestampValue": "2025-09-22T08:30:00Z" }));
        assert_eq!(decode_value(&encoded).unwrap(), FieldValue::Timestamp(ts));
    }

    #[test]
    fn nested_map_and_array() {
        let mut inner = Fields::new();
        inner.insert("n".into(), FieldValue::Integer(1));
        let value = FieldValue::Array(vec![
            FieldValue::Map(inner),
            FieldValue::Bytes(vec![1, 2, 3]),
            FieldValue::Null,
        ]);
        assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
    }

    #[test]
    fn empty_array_without_values_key() {
        assert_eq!(
            decode_value(&json!({ "arrayValue": {} })).unwrap(),
            FieldValue::Array(Vec::new())
        );
    }

    #[test]
    fn non_finite_doubles_travel_as_strings() {
        assert_eq!(
            encode_value(&FieldValue::Double(f64::NAN)),
            json!({ "doubleValue": "NaN" })
        );
        assert_eq!(
            encode_value(&FieldValue::Double(f64::INFINITY)),
            json!({ "doubleValue": "Infinity" })
        );
        assert_eq!(
            encode_value(&FieldValue::Double(f64::NEG_INFINITY)),
            json!({ "doubleValue": "-Infinity" })
        );

        match decode_value(&encode_value(&FieldValue::Double(f64::NAN))).unwrap() {
            FieldValue::Double(d) => assert!(d.is_nan()),
            other => panic!("Expected Double, got {other:?}"),
        }
        for d in [f64::INFINITY, f64::NEG_INFINITY, 1.5, -0.25] {
            let value = FieldValue::Double(d);
            assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
        }
    }

    #[test]
    fn null_double_is_rejected() {
        let err = decode_value(&json!({ "doubleValue": null })).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn geo_points_survive_a_copy() {
        let decoded = decode_value(&json!({
            "geoPointValue": { "latitude": 35.68, "longitude": 139.76 }
        }))
        .unwrap();
        assert_eq!(
            decoded,
            FieldValue::GeoPoint {
                latitude: 35.68,
                longitude: 139.76
            }
        );
        assert_eq!(decode_value(&encode_value(&decoded)).unwrap(), decoded);
    }

    #[test]
    fn geo_point_omits_zero_coordinates() {
        assert_eq!(
            decode_value(&json!({ "geoPointValue": { "latitude": 1.0 } })).unwrap(),
            FieldValue::GeoPoint {
                latitude: 1.0,
                longitude: 0.0
            }
        );
    }

    #[test]
    fn references_are_kept_verbatim() {
        let name = "projects/p/databases/(default)/documents/clubs/c1";
        let decoded = decode_value(&json!({ "referenceValue": name })).unwrap();
        assert_eq!(decoded, FieldValue::Reference(name.to_string()));
        assert_eq!(encode_value(&decoded), json!({ "referenceValue": name }));
    }

    #[test]
    fn unsupported_kind_is_an_error() {
        let err = decode_value(&json!({ "vectorValue": {} })).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn missing_fields_is_empty_document() {
        assert!(decode_fields(None).unwrap().is_empty());
    }
}
