//! Record builder and validator
//!
//! Validation semantics at `build()`:
//! - Every field with no default that is not optional must be set
//! - Each set value must match its field type, after numeric promotion
//! - `Null` is accepted only on optional fields
//! - Unset fields take their declared default (optional fields fall back to null)
//!
//! `set()` only checks that the field exists; type checks are deferred so
//! fields can be set in any order and overwritten.

use std::sync::Arc;

use crate::schema::{FieldSpec, Schema};

use super::errors::{RecordError, RecordResult};
use super::generic::Record;
use super::value::Value;

/// Accumulates field values for one schema and produces validated records.
///
/// The builder is reusable: each `build()` returns an independent record.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    schema: Arc<Schema>,
    /// One slot per schema field, in schema order
    slots: Vec<Option<Value>>,
}

impl RecordBuilder {
    /// Creates an empty builder scoped to `schema`.
    pub fn new(schema: Arc<Schema>) -> Self {
        let slots = vec![None; schema.len()];
        Self { schema, slots }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Assigns a value to a named field.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownField` if the schema does not declare
    /// `field`. The value's type is checked later, at `build()`.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> RecordResult<&mut Self> {
        let index = self
            .schema
            .field_index(field)
            .ok_or_else(|| RecordError::unknown_field(self.schema.full_name(), field))?;
        self.slots[index] = Some(value.into());
        Ok(self)
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) {
        self.slots[index] = Some(value);
    }

    /// Clears a previously set field.
    pub fn unset(&mut self, field: &str) -> RecordResult<&mut Self> {
        let index = self
            .schema
            .field_index(field)
            .ok_or_else(|| RecordError::unknown_field(self.schema.full_name(), field))?;
        self.slots[index] = None;
        Ok(self)
    }

    /// Returns whether `field` has an explicit value.
    pub fn is_set(&self, field: &str) -> bool {
        self.schema
            .field_index(field)
            .map_or(false, |i| self.slots[i].is_some())
    }

    /// Validates the accumulated values and builds an immutable record.
    ///
    /// # Errors
    ///
    /// - `RecordError::Validation` naming the first missing required field,
    ///   in schema field order
    /// - `RecordError::TypeMismatch` for the first value whose type does not
    ///   match its field
    pub fn build(&self) -> RecordResult<Record> {
        let fields = self.schema.fields();

        // Presence first, so a missing field is reported before any type error
        if let Some(missing) = fields
            .iter()
            .zip(&self.slots)
            .find(|(field, slot)| slot.is_none() && field.is_required())
        {
            return Err(RecordError::missing_field(&missing.0.name));
        }

        let mut values = Vec::with_capacity(fields.len());
        for (field, slot) in fields.iter().zip(&self.slots) {
            let value = match slot {
                Some(value) => check_value(field, value)?,
                None => field.default.clone().unwrap_or(Value::Null),
            };
            values.push(value);
        }

        Ok(Record::from_parts(self.schema.clone(), values))
    }
}

/// Checks one value against its field, returning the (possibly promoted) value.
fn check_value(field: &FieldSpec, value: &Value) -> RecordResult<Value> {
    if value.is_null() {
        if field.optional {
            return Ok(Value::Null);
        }
        return Err(type_error(field, value));
    }

    value
        .promote(field.field_type)
        .ok_or_else(|| type_error(field, value))
}

fn type_error(field: &FieldSpec, value: &Value) -> RecordError {
    RecordError::TypeMismatch {
        field: field.name.clone(),
        expected: field.field_type.type_name(),
        actual: value.kind_name(),
    }
}
