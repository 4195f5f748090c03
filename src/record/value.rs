//! Dynamic field values

use std::fmt;

use crate::schema::FieldType;

/// A single field value.
///
/// One variant per field type, plus `Null` for optional fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    /// Ordered; duplicates allowed
    StringArray(Vec<String>),
    /// Milliseconds since the Unix epoch
    TimestampMillis(i64),
}

impl Value {
    /// Runtime type name, matching `FieldType::type_name` for non-null values
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Boolean(_) => "boolean",
            Value::StringArray(_) => "array<string>",
            Value::TimestampMillis(_) => "timestamp-millis",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Exact runtime type check, no promotion
    pub fn matches(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (Value::String(_), FieldType::String)
                | (Value::Int32(_), FieldType::Int32)
                | (Value::Int64(_), FieldType::Int64)
                | (Value::Float32(_), FieldType::Float32)
                | (Value::Float64(_), FieldType::Float64)
                | (Value::Boolean(_), FieldType::Boolean)
                | (Value::StringArray(_), FieldType::StringArray)
                | (Value::TimestampMillis(_), FieldType::TimestampMillis)
        )
    }

    /// Converts this value to `field_type`, applying the numeric promotions
    /// the schema type system allows:
    ///
    /// - int32 -> int64, float32, float64
    /// - int64 -> float32, float64, timestamp-millis
    /// - float32 -> float64
    ///
    /// Returns `None` when no exact match or promotion exists. `Null` is
    /// never converted.
    pub fn promote(&self, field_type: FieldType) -> Option<Value> {
        if self.matches(field_type) {
            return Some(self.clone());
        }

        let promoted = match (self, field_type) {
            (Value::Int32(v), FieldType::Int64) => Value::Int64(i64::from(*v)),
            (Value::Int32(v), FieldType::Float32) => Value::Float32(*v as f32),
            (Value::Int32(v), FieldType::Float64) => Value::Float64(f64::from(*v)),
            (Value::Int64(v), FieldType::Float32) => Value::Float32(*v as f32),
            (Value::Int64(v), FieldType::Float64) => Value::Float64(*v as f64),
            (Value::Int64(v), FieldType::TimestampMillis) => Value::TimestampMillis(*v),
            (Value::Float32(v), FieldType::Float64) => Value::Float64(f64::from(*v)),
            _ => return None,
        };
        Some(promoted)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view; also accepts int32 and timestamp values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) | Value::TimestampMillis(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float32(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating point view; also accepts float32
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            Value::StringArray(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_timestamp_millis(&self) -> Option<i64> {
        match self {
            Value::TimestampMillis(ms) => Some(*ms),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::json::value_to_json(self))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::StringArray(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::StringArray(items.into_iter().map(str::to_owned).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
