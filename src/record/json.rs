//! JSON mapping for values and records
//!
//! Conversion from JSON is type-directed: the declared field type decides how
//! a JSON literal is read. Used for schema defaults and record import.

use std::sync::Arc;

use serde_json::{Map, Number, Value as JsonValue};

use crate::schema::{FieldType, Schema};

use super::builder::RecordBuilder;
use super::errors::{RecordError, RecordResult};
use super::generic::Record;
use super::value::Value;

/// JSON kind name for diagnostics
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "number",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Renders a value as JSON. Non-finite floats render as `null`.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Int32(v) => JsonValue::from(*v),
        Value::Int64(v) | Value::TimestampMillis(v) => JsonValue::from(*v),
        Value::Float32(v) => float_to_json(f64::from(*v)),
        Value::Float64(v) => float_to_json(*v),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::StringArray(items) => {
            JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
        }
    }
}

fn float_to_json(v: f64) -> JsonValue {
    Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

/// Reads a JSON literal as a value of `field_type`.
///
/// JSON `null` maps to `Value::Null`; whether that is legal is up to the
/// caller. On failure returns a short description of what was found.
pub fn value_from_json(json: &JsonValue, field_type: FieldType) -> Result<Value, &'static str> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    let value = match field_type {
        FieldType::String => Value::String(json.as_str().ok_or(json_kind(json))?.to_owned()),
        FieldType::Int32 => {
            let v = json.as_i64().ok_or(json_kind(json))?;
            Value::Int32(i32::try_from(v).map_err(|_| "integer out of int32 range")?)
        }
        FieldType::Int64 => Value::Int64(json.as_i64().ok_or(json_kind(json))?),
        FieldType::TimestampMillis => Value::TimestampMillis(json.as_i64().ok_or(json_kind(json))?),
        FieldType::Float32 => {
            let v = json.as_f64().ok_or(json_kind(json))?;
            if v.abs() > f64::from(f32::MAX) {
                return Err("number out of float32 range");
            }
            Value::Float32(v as f32)
        }
        FieldType::Float64 => Value::Float64(json.as_f64().ok_or(json_kind(json))?),
        FieldType::Boolean => Value::Boolean(json.as_bool().ok_or(json_kind(json))?),
        FieldType::StringArray => {
            let items = json.as_array().ok_or(json_kind(json))?;
            let mut strings = Vec::with_capacity(items.len());
            for item in items {
                strings.push(item.as_str().ok_or("array with non-string element")?.to_owned());
            }
            Value::StringArray(strings)
        }
    };
    Ok(value)
}

/// Renders a record as a JSON object in schema field order.
pub fn record_to_json(record: &Record) -> JsonValue {
    let mut obj = Map::new();
    for (name, value) in record.iter() {
        obj.insert(name.to_owned(), value_to_json(value));
    }
    JsonValue::Object(obj)
}

/// Builds a record from a JSON object through `RecordBuilder`, so the usual
/// presence and default rules apply.
pub fn record_from_json(schema: Arc<Schema>, json: &JsonValue) -> RecordResult<Record> {
    let obj = json.as_object().ok_or_else(|| RecordError::TypeMismatch {
        field: "$root".into(),
        expected: "object",
        actual: json_kind(json),
    })?;

    let mut builder = RecordBuilder::new(schema.clone());
    for (name, literal) in obj {
        let field = schema
            .field(name)
            .ok_or_else(|| RecordError::unknown_field(schema.full_name(), name))?;
        let value = value_from_json(literal, field.field_type).map_err(|actual| {
            RecordError::TypeMismatch {
                field: name.clone(),
                expected: field.field_type.type_name(),
                actual,
            }
        })?;
        builder.set(name, value)?;
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(
                "Person",
                vec![
                    FieldSpec::new("name", FieldType::String),
                    FieldSpec::new("age", FieldType::Int32),
                    FieldSpec::new("tags", FieldType::StringArray).with_default(Vec::<String>::new()),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_type_directed_conversion() {
        assert_eq!(value_from_json(&json!(5), FieldType::Float32), Ok(Value::Float32(5.0)));
        assert_eq!(value_from_json(&json!(5), FieldType::Int64), Ok(Value::Int64(5)));
        assert_eq!(
            value_from_json(&json!(1_700_000_000_000i64), FieldType::TimestampMillis),
            Ok(Value::TimestampMillis(1_700_000_000_000))
        );
        assert_eq!(value_from_json(&json!(null), FieldType::String), Ok(Value::Null));
        assert_eq!(value_from_json(&json!("5"), FieldType::Int32), Err("string"));
        assert_eq!(value_from_json(&json!(1.5), FieldType::Int32), Err("number"));
        assert!(value_from_json(&json!(["a", 1]), FieldType::StringArray).is_err());
    }

    #[test]
    fn test_float32_range_checked() {
        assert_eq!(
            value_from_json(&json!(1e300), FieldType::Float32),
            Err("number out of float32 range")
        );
        assert_eq!(
            value_from_json(&json!(-1e300), FieldType::Float32),
            Err("number out of float32 range")
        );
        assert_eq!(
            value_from_json(&json!(f64::from(f32::MAX)), FieldType::Float32),
            Ok(Value::Float32(f32::MAX))
        );
        assert_eq!(value_from_json(&json!(1e300), FieldType::Float64), Ok(Value::Float64(1e300)));
    }

    #[test]
    fn test_non_finite_float_renders_null() {
        assert_eq!(value_to_json(&Value::Float64(f64::NAN)), JsonValue::Null);
    }

    #[test]
    fn test_record_from_json_applies_defaults() {
        let record = record_from_json(schema(), &json!({"name": "Ann", "age": 30})).unwrap();
        assert_eq!(record.get("tags"), Some(&Value::StringArray(vec![])));
        assert_eq!(
            record_to_json(&record),
            json!({"name": "Ann", "age": 30, "tags": []})
        );
    }

    #[test]
    fn test_record_from_json_unknown_field() {
        let err = record_from_json(schema(), &json!({"name": "Ann", "age": 1, "zip": "x"}))
            .unwrap_err();
        assert!(matches!(err, RecordError::UnknownField { ref field, .. } if field == "zip"));
    }

    #[test]
    fn test_record_from_json_wrong_type() {
        let err = record_from_json(schema(), &json!({"name": "Ann", "age": "old"})).unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { ref field, .. } if field == "age"));
    }

    #[test]
    fn test_record_from_json_requires_object() {
        assert!(record_from_json(schema(), &json!([1, 2])).is_err());
    }
}
