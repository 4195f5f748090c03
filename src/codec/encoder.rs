//! Record encoder

use crate::record::{Record, Value};
use crate::schema::{FieldSpec, FieldType, Schema};

use super::errors::{CodecError, CodecResult};
use super::varint::write_varint;

/// Encodes `record` against `schema`.
///
/// Values are looked up by field name and written in schema order. Types are
/// checked again here, independently of `RecordBuilder`.
///
/// # Errors
///
/// Returns `CodecError::Encode` if a field is absent from the record, holds
/// a value of the wrong runtime type, or holds `Null` on a non-optional field.
pub fn encode(record: &Record, schema: &Schema) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(estimate_size(record));
    encode_into(record, schema, &mut buf)?;
    Ok(buf)
}

/// Like `encode`, appending to an existing buffer.
///
/// On error `buf` may hold a partially written record; callers reusing the
/// buffer should truncate it.
pub fn encode_into(record: &Record, schema: &Schema, buf: &mut Vec<u8>) -> CodecResult<()> {
    for field in schema.fields() {
        let value = record
            .get(&field.name)
            .ok_or_else(|| CodecError::encode(&field.name, "field absent from record"))?;
        encode_field(field, value, buf)?;
    }
    Ok(())
}

fn encode_field(field: &FieldSpec, value: &Value, buf: &mut Vec<u8>) -> CodecResult<()> {
    if field.optional {
        if value.is_null() {
            buf.push(0);
            return Ok(());
        }
        buf.push(1);
    }

    match (field.field_type, value) {
        (FieldType::String, Value::String(s)) => write_string(buf, s),
        (FieldType::Int32, Value::Int32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (FieldType::Int64, Value::Int64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (FieldType::Float32, Value::Float32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (FieldType::Float64, Value::Float64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (FieldType::Boolean, Value::Boolean(b)) => buf.push(u8::from(*b)),
        (FieldType::StringArray, Value::StringArray(items)) => {
            write_varint(buf, items.len() as i64);
            for item in items {
                write_string(buf, item);
            }
        }
        (FieldType::TimestampMillis, Value::TimestampMillis(ms)) => {
            buf.extend_from_slice(&ms.to_le_bytes())
        }
        (expected, actual) => {
            return Err(CodecError::encode(
                &field.name,
                format!("expected {}, got {}", expected, actual.kind_name()),
            ));
        }
    }
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_varint(buf, s.len() as i64);
    buf.extend_from_slice(s.as_bytes());
}

fn estimate_size(record: &Record) -> usize {
    record
        .values()
        .iter()
        .map(|v| match v {
            Value::String(s) => s.len() + 2,
            Value::StringArray(items) => items.iter().map(|s| s.len() + 2).sum::<usize>() + 2,
            _ => 9,
        })
        .sum()
}
