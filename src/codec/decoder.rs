//! Record decoder
//!
//! Reads fields strictly in schema order. Every length prefix is checked
//! against the remaining input before anything is allocated, so corrupt input
//! cannot trigger an over-read or an oversized allocation.

use std::sync::Arc;

use crate::record::{Record, Value};
use crate::schema::{FieldSpec, FieldType, Schema};

use super::errors::{CodecError, CodecResult};
use super::varint::{read_varint, VarintRead};

/// Decodes one record produced by `encode` with the same schema.
///
/// # Errors
///
/// - `CodecError::Truncated` if the input ends mid-field
/// - `CodecError::Decode` if a length prefix is negative or exceeds the
///   remaining input, a string is not UTF-8, a boolean or presence byte is
///   not 0/1, or bytes remain after the last field
pub fn decode(bytes: &[u8], schema: &Arc<Schema>) -> CodecResult<Record> {
    let mut cursor = Cursor::new(bytes);
    let mut values = Vec::with_capacity(schema.len());

    for field in schema.fields() {
        values.push(decode_field(&mut cursor, field)?);
    }

    if cursor.remaining() > 0 {
        return Err(CodecError::decode(
            "$record",
            cursor.pos,
            format!("{} trailing bytes after last field", cursor.remaining()),
        ));
    }

    Ok(Record::from_parts(schema.clone(), values))
}

fn decode_field(cursor: &mut Cursor<'_>, field: &FieldSpec) -> CodecResult<Value> {
    let name = field.name.as_str();

    if field.optional && !cursor.read_flag(name, "presence")? {
        return Ok(Value::Null);
    }

    let value = match field.field_type {
        FieldType::String => Value::String(cursor.read_string(name)?),
        FieldType::Int32 => Value::Int32(i32::from_le_bytes(cursor.read_array(name)?)),
        FieldType::Int64 => Value::Int64(i64::from_le_bytes(cursor.read_array(name)?)),
        FieldType::Float32 => Value::Float32(f32::from_le_bytes(cursor.read_array(name)?)),
        FieldType::Float64 => Value::Float64(f64::from_le_bytes(cursor.read_array(name)?)),
        FieldType::Boolean => Value::Boolean(cursor.read_flag(name, "boolean")?),
        FieldType::StringArray => {
            // Each element takes at least one byte, which bounds the count
            let count = cursor.read_length(name)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(cursor.read_string(name)?);
            }
            Value::StringArray(items)
        }
        FieldType::TimestampMillis => {
            Value::TimestampMillis(i64::from_le_bytes(cursor.read_array(name)?))
        }
    };
    Ok(value)
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, field: &str, n: usize) -> CodecResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::Truncated {
                field: field.to_owned(),
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self, field: &str) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    /// Single byte that must be 0 or 1
    fn read_flag(&mut self, field: &str, what: &str) -> CodecResult<bool> {
        let offset = self.pos;
        match self.take(field, 1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::decode(
                field,
                offset,
                format!("invalid {} byte {:#04x}", what, other),
            )),
        }
    }

    /// Zig-zag varint length, validated against the remaining input
    fn read_length(&mut self, field: &str) -> CodecResult<usize> {
        let offset = self.pos;
        let (length, consumed) = match read_varint(&self.buf[self.pos..]) {
            VarintRead::Value(v, consumed) => (v, consumed),
            VarintRead::Incomplete => {
                return Err(CodecError::Truncated {
                    field: field.to_owned(),
                    offset,
                    needed: 1,
                })
            }
            VarintRead::Overflow => {
                return Err(CodecError::decode(field, offset, "varint length overflow"))
            }
        };
        self.pos += consumed;

        if length < 0 {
            return Err(CodecError::decode(
                field,
                offset,
                format!("negative length prefix {}", length),
            ));
        }
        if length as u64 > self.remaining() as u64 {
            return Err(CodecError::decode(
                field,
                offset,
                format!(
                    "length prefix {} exceeds remaining {} bytes",
                    length,
                    self.remaining()
                ),
            ));
        }
        Ok(length as usize)
    }

    fn read_string(&mut self, field: &str) -> CodecResult<String> {
        let len = self.read_length(field)?;
        let offset = self.pos;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| CodecError::decode(field, offset, format!("invalid UTF-8: {}", e)))
    }
}
