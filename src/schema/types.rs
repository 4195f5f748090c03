//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int32 / int64: signed integers
//! - float32 / float64: IEEE-754 floating point
//! - boolean
//! - array<string>: ordered list of strings
//! - timestamp-millis: logical type over int64 (milliseconds since the Unix epoch)

use std::fmt;

use crate::record::Value;

use super::errors::{SchemaError, SchemaResult};

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    /// `array<string>`
    StringArray,
    /// Logical type over int64
    TimestampMillis,
}

impl FieldType {
    /// Returns the canonical type name as written in schema text
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
            FieldType::Boolean => "boolean",
            FieldType::StringArray => "array<string>",
            FieldType::TimestampMillis => "timestamp-millis",
        }
    }

    /// Resolves a type name, accepting the compatibility spellings
    /// (`int`, `long`, `float`, `double`, `bool`).
    pub fn from_name(name: &str) -> Option<Self> {
        let field_type = match name {
            "string" => FieldType::String,
            "int32" | "int" => FieldType::Int32,
            "int64" | "long" => FieldType::Int64,
            "float32" | "float" => FieldType::Float32,
            "float64" | "double" => FieldType::Float64,
            "boolean" | "bool" => FieldType::Boolean,
            "array<string>" => FieldType::StringArray,
            "timestamp-millis" => FieldType::TimestampMillis,
            _ => return None,
        };
        Some(field_type)
    }

    /// Returns true for logical types layered over a primitive
    pub fn is_logical(&self) -> bool {
        matches!(self, FieldType::TimestampMillis)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name, unique within its schema
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Literal used when the field is left unset at build time
    pub default: Option<Value>,
    /// Optional fields may hold `Value::Null`
    pub optional: bool,
    pub doc: Option<String>,
}

impl FieldSpec {
    /// Create a required field with no default
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            optional: false,
            doc: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A field must be set explicitly when it has no default and is not optional
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.optional
    }

    /// Checks that the default (if any) is a literal of the declared type.
    fn validate_default(&self) -> SchemaResult<()> {
        let Some(default) = &self.default else {
            return Ok(());
        };

        if default.is_null() {
            if self.optional {
                return Ok(());
            }
            return Err(SchemaError::invalid_default(
                &self.name,
                self.field_type.type_name(),
                "null on a non-optional field",
            ));
        }

        if !default.matches(self.field_type) {
            return Err(SchemaError::invalid_default(
                &self.name,
                self.field_type.type_name(),
                default.kind_name(),
            ));
        }

        Ok(())
    }
}

/// Complete record schema: identity plus ordered field list.
///
/// Equality is structural. Two schemas with the same identity and the same
/// fields in the same order are interchangeable for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    namespace: Option<String>,
    doc: Option<String>,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates a schema, checking name, field uniqueness and defaults.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::parse("schema name must not be empty"));
        }

        for (i, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::parse(format!("field #{} has an empty name", i)));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::duplicate_field(&field.name));
            }
            field.validate_default()?;
        }

        Ok(Self {
            name,
            namespace: None,
            doc: None,
            fields,
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = if namespace.is_empty() { None } else { Some(namespace) };
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// `namespace.name`, or just `name` without a namespace
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in declaration order
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Describes the first structural difference from `other`, or `None`
    /// when the schemas are equal.
    pub fn first_difference(&self, other: &Schema) -> Option<String> {
        if self.full_name() != other.full_name() {
            return Some(format!(
                "schema name '{}' != '{}'",
                self.full_name(),
                other.full_name()
            ));
        }

        for (i, (ours, theirs)) in self.fields.iter().zip(&other.fields).enumerate() {
            if ours != theirs {
                return Some(format!(
                    "field #{} differs: '{}' ({}) vs '{}' ({})",
                    i, ours.name, ours.field_type, theirs.name, theirs.field_type
                ));
            }
        }

        if self.fields.len() != other.fields.len() {
            return Some(format!(
                "field count {} != {}",
                self.fields.len(),
                other.fields.len()
            ));
        }

        if self.doc != other.doc {
            return Some("schema doc differs".into());
        }

        None
    }
}
