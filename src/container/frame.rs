//! On-disk layout: header and record frames
//!
//! ```text
//! magic            4 bytes  "ARC\x01"
//! schema length    u32 LE
//! schema text      canonical schema JSON (UTF-8)
//! metadata count   u32 LE
//!   key length     u32 LE, key bytes (UTF-8)
//!   value length   u32 LE, value bytes
//! record frames    [u32 LE payload length][payload][u32 LE CRC32 of payload] ...
//! ```
//!
//! No trailing index; records are found by sequential scan.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::Path;

use crc32fast::Hasher;

use crate::schema::Schema;

use super::errors::{ContainerError, ContainerResult};

/// File magic marker
pub const MAGIC: [u8; 4] = *b"ARC\x01";

/// Length prefix plus checksum trailer
pub const FRAME_OVERHEAD: u64 = 8;

/// Metadata keys under this prefix are written by the container itself
pub const RESERVED_METADATA_PREFIX: &str = "aerorecord.";
pub const META_FILE_ID: &str = "aerorecord.file_id";
pub const META_CREATED_AT: &str = "aerorecord.created_at";

/// CRC32 (IEEE) over a record payload
pub fn payload_checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Appends one framed record to `buf`. `payload_len` is the checked length
/// of `payload`.
pub fn write_frame(buf: &mut Vec<u8>, payload_len: u32, payload: &[u8]) {
    debug_assert_eq!(payload_len as usize, payload.len());
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&payload_checksum(payload).to_le_bytes());
}

/// Container header: embedded writer schema plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub schema: Schema,
    pub metadata: BTreeMap<String, Vec<u8>>,
}

impl Header {
    pub fn encode(&self) -> Vec<u8> {
        let schema_text = self.schema.to_canonical_json();
        let mut buf = Vec::with_capacity(16 + schema_text.len());

        buf.extend_from_slice(&MAGIC);
        write_bytes(&mut buf, schema_text.as_bytes());

        buf.extend_from_slice(&(self.metadata.len() as u32).to_le_bytes());
        for (key, value) in &self.metadata {
            write_bytes(&mut buf, key.as_bytes());
            write_bytes(&mut buf, value);
        }

        buf
    }

    /// Reads and validates a header from the start of a file of `file_len`
    /// bytes. Returns the header and its encoded length.
    ///
    /// # Errors
    ///
    /// - `ContainerError::CorruptHeader` on bad magic, truncation, lengths
    ///   past the end of the file, or unparsable schema/metadata
    /// - `ContainerError::Io` for any other read failure
    pub fn read_from<R: Read>(input: &mut R, file_len: u64, path: &Path) -> ContainerResult<(Header, u64)> {
        let mut reader = HeaderReader {
            input,
            remaining: file_len,
            consumed: 0,
            path,
        };

        let magic: [u8; 4] = reader.read_array("magic marker")?;
        if magic != MAGIC {
            return Err(ContainerError::corrupt_header(
                path,
                format!("bad magic marker {:02x?}", magic),
            ));
        }

        let schema_bytes = reader.read_bytes("schema text")?;
        let schema_text = String::from_utf8(schema_bytes)
            .map_err(|_| ContainerError::corrupt_header(path, "schema text is not UTF-8"))?;
        let schema = Schema::parse(&schema_text).map_err(|e| {
            ContainerError::corrupt_header(path, format!("embedded schema: {}", e))
        })?;

        let count = u32::from_le_bytes(reader.read_array("metadata count")?);
        // Each entry needs at least two length prefixes
        if u64::from(count) * 8 > reader.remaining {
            return Err(ContainerError::corrupt_header(
                path,
                format!("metadata count {} exceeds file size", count),
            ));
        }

        let mut metadata = BTreeMap::new();
        for _ in 0..count {
            let key = String::from_utf8(reader.read_bytes("metadata key")?)
                .map_err(|_| ContainerError::corrupt_header(path, "metadata key is not UTF-8"))?;
            let value = reader.read_bytes("metadata value")?;
            if metadata.insert(key.clone(), value).is_some() {
                return Err(ContainerError::corrupt_header(
                    path,
                    format!("duplicate metadata key '{}'", key),
                ));
            }
        }

        Ok((Header { schema, metadata }, reader.consumed))
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Bounds-checked reads against the known file size
struct HeaderReader<'a, R> {
    input: &'a mut R,
    remaining: u64,
    consumed: u64,
    path: &'a Path,
}

impl<R: Read> HeaderReader<'_, R> {
    fn read_exact(&mut self, buf: &mut [u8], what: &str) -> ContainerResult<()> {
        if buf.len() as u64 > self.remaining {
            return Err(ContainerError::corrupt_header(
                self.path,
                format!("truncated header while reading {}", what),
            ));
        }
        self.input.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                ContainerError::corrupt_header(
                    self.path,
                    format!("truncated header while reading {}", what),
                )
            } else {
                ContainerError::io(self.path, e)
            }
        })?;
        self.remaining -= buf.len() as u64;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> ContainerResult<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out, what)?;
        Ok(out)
    }

    /// u32 length prefix followed by that many bytes
    fn read_bytes(&mut self, what: &str) -> ContainerResult<Vec<u8>> {
        let len = u64::from(u32::from_le_bytes(self.read_array(what)?));
        if len > self.remaining {
            return Err(ContainerError::corrupt_header(
                self.path,
                format!("{} length {} exceeds remaining {} bytes", what, len, self.remaining),
            ));
        }
        let mut out = vec![0u8; len as usize];
        self.read_exact(&mut out, what)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};
    use std::io::Cursor;

    fn header() -> Header {
        let schema = Schema::new("Point", vec![FieldSpec::new("x", FieldType::Int32)]).unwrap();
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), b"unit-test".to_vec());
        Header { schema, metadata }
    }

    fn read(bytes: &[u8]) -> ContainerResult<(Header, u64)> {
        Header::read_from(&mut Cursor::new(bytes), bytes.len() as u64, Path::new("mem"))
    }

    #[test]
    fn test_header_roundtrip() {
        let original = header();
        let bytes = original.encode();
        let (parsed, consumed) = read(&bytes).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(consumed, bytes.len() as u64);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = header().encode();
        bytes[0] = b'X';
        let err = read(&bytes).unwrap_err();
        assert_eq!(err.code(), "AERO_CORRUPT_HEADER");
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_every_truncation_is_corrupt_header() {
        let bytes = header().encode();
        for cut in 0..bytes.len() {
            let err = read(&bytes[..cut]).unwrap_err();
            assert_eq!(err.code(), "AERO_CORRUPT_HEADER", "cut at {}", cut);
        }
    }

    #[test]
    fn test_unparsable_schema_text() {
        let mut bytes = MAGIC.to_vec();
        write_bytes(&mut bytes, b"not json");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = read(&bytes).unwrap_err();
        assert!(err.to_string().contains("embedded schema"));
    }

    #[test]
    fn test_oversized_schema_length() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        let err = read(&bytes).unwrap_err();
        assert_eq!(err.code(), "AERO_CORRUPT_HEADER");
    }

    #[test]
    fn test_frame_layout() {
        let mut buf = Vec::new();
        write_frame(&mut buf, 3, b"abc");
        assert_eq!(buf.len() as u64, 3 + FRAME_OVERHEAD);
        assert_eq!(&buf[..4], &3u32.to_le_bytes());
        assert_eq!(&buf[4..7], b"abc");
        assert_eq!(&buf[7..], &payload_checksum(b"abc").to_le_bytes());
    }

    #[test]
    fn test_checksum_detects_single_bit_flip() {
        let mut data = b"payload".to_vec();
        let original = payload_checksum(&data);
        data[2] ^= 0x01;
        assert_ne!(original, payload_checksum(&data));
    }
}
