//! Schema text parsing and canonical serialization
//!
//! Schema text is a JSON object:
//!
//! ```json
//! {
//!   "type": "record",
//!   "name": "Customer",
//!   "namespace": "com.example",
//!   "fields": [
//!     {"name": "first_name", "type": "string"},
//!     {"name": "emails", "type": "array<string>", "default": []},
//!     {"name": "creation_ts", "type": "timestamp-millis"}
//!   ]
//! }
//! ```
//!
//! Field types may also use the object forms `{"type": "array", "items": "string"}`
//! and `{"type": "long", "logicalType": "timestamp-millis"}`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use crate::record::json::{json_kind, value_from_json, value_to_json};

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldSpec, FieldType, Schema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    field_type: JsonValue,
    #[serde(default)]
    default: Option<JsonValue>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    doc: Option<String>,
}

impl Schema {
    /// Parses a schema definition from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Parse` on malformed JSON, unknown type names,
    /// duplicate field names, or defaults that do not match their field type.
    pub fn parse(text: &str) -> SchemaResult<Self> {
        let raw: RawSchema = serde_json::from_str(text)
            .map_err(|e| SchemaError::parse(format!("invalid schema JSON: {}", e)))?;

        if let Some(kind) = raw.kind.as_deref() {
            if kind != "record" {
                return Err(SchemaError::parse(format!(
                    "top-level type must be 'record', got '{}'",
                    kind
                )));
            }
        }

        let mut fields = Vec::with_capacity(raw.fields.len());
        for raw_field in raw.fields {
            fields.push(resolve_field(raw_field)?);
        }

        let mut schema = Schema::new(raw.name, fields)?;
        if let Some(namespace) = raw.namespace {
            schema = schema.with_namespace(namespace);
        }
        if let Some(doc) = raw.doc {
            schema = schema.with_doc(doc);
        }

        debug!(
            schema = %schema.full_name(),
            fields = schema.len(),
            "parsed schema"
        );
        Ok(schema)
    }

    /// Reads and parses a schema file.
    pub fn from_file(path: &Path) -> SchemaResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&text)
    }

    /// Canonical JSON form of this schema.
    ///
    /// Type names are normalized, key order is fixed, and
    /// `Schema::parse(&s.to_canonical_json()) == s`.
    pub fn to_canonical_json(&self) -> String {
        self.to_json().to_string()
    }

    /// Pretty-printed canonical form, for display
    pub fn to_pretty_json(&self) -> String {
        // Serializing a serde_json::Value cannot fail
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }

    fn to_json(&self) -> JsonValue {
        let mut root = Map::new();
        root.insert("type".into(), json!("record"));
        root.insert("name".into(), json!(self.name()));
        if let Some(ns) = self.namespace() {
            root.insert("namespace".into(), json!(ns));
        }
        if let Some(doc) = self.doc() {
            root.insert("doc".into(), json!(doc));
        }

        let fields: Vec<JsonValue> = self
            .fields()
            .iter()
            .map(|field| {
                let mut obj = Map::new();
                obj.insert("name".into(), json!(field.name));
                obj.insert("type".into(), json!(field.field_type.type_name()));
                if let Some(default) = &field.default {
                    obj.insert("default".into(), value_to_json(default));
                }
                if field.optional {
                    obj.insert("optional".into(), json!(true));
                }
                if let Some(doc) = &field.doc {
                    obj.insert("doc".into(), json!(doc));
                }
                JsonValue::Object(obj)
            })
            .collect();
        root.insert("fields".into(), JsonValue::Array(fields));

        JsonValue::Object(root)
    }
}

fn resolve_field(raw: RawField) -> SchemaResult<FieldSpec> {
    let field_type = resolve_type(&raw.name, &raw.field_type)?;

    let mut spec = FieldSpec::new(raw.name, field_type);
    spec.optional = raw.optional;
    spec.doc = raw.doc;

    if let Some(literal) = raw.default {
        let value = value_from_json(&literal, field_type).map_err(|actual| {
            SchemaError::invalid_default(&spec.name, field_type.type_name(), actual)
        })?;
        spec.default = Some(value);
    }

    Ok(spec)
}

fn resolve_type(field: &str, raw: &JsonValue) -> SchemaResult<FieldType> {
    match raw {
        JsonValue::String(name) => {
            FieldType::from_name(name).ok_or_else(|| SchemaError::unknown_type(field, name))
        }
        JsonValue::Object(obj) => {
            let base = obj
                .get("type")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| SchemaError::in_field(field, "type object needs a string 'type'"))?;
            let logical = obj.get("logicalType").and_then(JsonValue::as_str);

            match (base, logical) {
                ("array", None) => match obj.get("items").and_then(JsonValue::as_str) {
                    Some("string") => Ok(FieldType::StringArray),
                    Some(other) => Err(SchemaError::in_field(
                        field,
                        format!("only array<string> is supported, got items '{}'", other),
                    )),
                    None => Err(SchemaError::in_field(field, "array type needs 'items'")),
                },
                ("long" | "int64", Some("timestamp-millis")) => Ok(FieldType::TimestampMillis),
                (_, Some(other)) => Err(SchemaError::in_field(
                    field,
                    format!("unsupported logical type '{}' over '{}'", other, base),
                )),
                (name, None) => {
                    FieldType::from_name(name).ok_or_else(|| SchemaError::unknown_type(field, name))
                }
            }
        }
        other => Err(SchemaError::in_field(
            field,
            format!("type must be a string or object, got {}", json_kind(other)),
        )),
    }
}
