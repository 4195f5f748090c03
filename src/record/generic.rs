//! Schema-bound generic record

use std::fmt;
use std::sync::Arc;

use crate::schema::Schema;

use super::builder::RecordBuilder;
use super::json::record_to_json;
use super::value::Value;

/// An immutable record: one value per schema field, in schema order.
///
/// Created by `RecordBuilder::build` (validated) or by `codec::decode`.
/// Changes go through `to_builder`, which yields a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    /// Callers guarantee `values` lines up with `schema.fields()`.
    pub(crate) fn from_parts(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Schema this record was built or decoded against
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Value of a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.field_index(name).and_then(|i| self.values.get(i))
    }

    /// Values in schema field order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(field name, value)` pairs in schema field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builder pre-populated with this record's values
    pub fn to_builder(&self) -> RecordBuilder {
        let mut builder = RecordBuilder::new(self.schema.clone());
        for (index, value) in self.values.iter().enumerate() {
            builder.set_at(index, value.clone());
        }
        builder
    }

    pub fn to_json(&self) -> serde_json::Value {
        record_to_json(self)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
