//! Container reader with strict corruption detection
//!
//! - The header is fully validated before a reader is returned
//! - Records are read strictly in file order, one frame at a time
//! - A corrupt frame is an error, never skipped; the error reports where the
//!   next frame starts (when known) so the caller can choose to resume

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::codec;
use crate::record::Record;
use crate::schema::Schema;

use super::config::ContainerConfig;
use super::errors::{ContainerError, ContainerResult};
use super::frame::{payload_checksum, Header, FRAME_OVERHEAD};

/// Forward-only, single-pass reader over one container file.
pub struct ContainerReader {
    path: PathBuf,
    schema: Arc<Schema>,
    metadata: BTreeMap<String, Vec<u8>>,
    /// `None` once closed
    input: Option<BufReader<File>>,
    /// First byte after the header
    data_start: u64,
    /// Start of the next frame
    offset: u64,
    file_size: u64,
    max_record_bytes: u32,
    records_read: u64,
    /// Set after the iterator yields an error
    failed: bool,
}

impl ContainerReader {
    /// Opens a container and parses its header.
    ///
    /// # Errors
    ///
    /// - `ContainerError::Io` if the file cannot be opened
    /// - `ContainerError::CorruptHeader` if the magic marker, schema text or
    ///   metadata block is invalid
    pub fn open(path: &Path) -> ContainerResult<Self> {
        Self::open_with_config(path, &ContainerConfig::default())
    }

    pub fn open_with_config(path: &Path, config: &ContainerConfig) -> ContainerResult<Self> {
        let file = File::open(path).map_err(|e| ContainerError::io(path, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| ContainerError::io(path, e))?
            .len();

        let mut input = BufReader::with_capacity(config.buffer_capacity, file);
        let (header, header_len) = Header::read_from(&mut input, file_size, path)?;

        info!(
            path = %path.display(),
            schema = %header.schema.full_name(),
            bytes = file_size,
            "opened container"
        );

        Ok(Self {
            path: path.to_path_buf(),
            schema: Arc::new(header.schema),
            metadata: header.metadata,
            input: Some(input),
            data_start: header_len,
            offset: header_len,
            file_size,
            max_record_bytes: config.max_record_bytes,
            records_read: 0,
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writer schema embedded in the header
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Header metadata, including the writer's reserved keys
    pub fn metadata(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.metadata
    }

    /// Metadata value as UTF-8, if present and valid
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Byte offset of the next frame
    pub fn current_offset(&self) -> u64 {
        self.offset
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Whether at least one more frame remains before end of file.
    ///
    /// Always false once closed.
    pub fn has_next(&self) -> bool {
        self.input.is_some() && self.offset < self.file_size
    }

    /// Reads and decodes the next record.
    ///
    /// # Errors
    ///
    /// - `ContainerError::Exhausted` if every frame has been consumed
    /// - `ContainerError::Closed` after `close`
    /// - `ContainerError::CorruptRecord` if the frame's length, checksum or
    ///   payload is invalid. The cursor is not advanced.
    /// - `ContainerError::Io` on read failure
    pub fn next_record(&mut self) -> ContainerResult<Record> {
        if self.input.is_none() {
            return Err(ContainerError::closed(&self.path));
        }

        let frame_start = self.offset;
        if frame_start >= self.file_size {
            return Err(ContainerError::Exhausted {
                path: self.path.display().to_string(),
                records_read: self.records_read,
            });
        }

        match self.read_frame(frame_start) {
            Ok((record, next_frame)) => {
                self.offset = next_frame;
                self.records_read += 1;
                Ok(record)
            }
            Err(e) => {
                // Leave the cursor on the rejected frame
                if let Some(input) = self.input.as_mut() {
                    input
                        .seek(SeekFrom::Start(frame_start))
                        .map_err(|seek_err| ContainerError::io(&self.path, seek_err))?;
                }
                Err(e)
            }
        }
    }

    /// Reads one frame starting at `frame_start`, returning the record and
    /// the offset of the following frame.
    fn read_frame(&mut self, frame_start: u64) -> ContainerResult<(Record, u64)> {
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| ContainerError::closed(&self.path))?;

        let remaining = self.file_size - frame_start;
        if remaining < FRAME_OVERHEAD {
            return Err(corrupt(
                &self.path,
                frame_start,
                None,
                format!("{} trailing bytes cannot hold a frame", remaining),
            ));
        }

        let mut len_buf = [0u8; 4];
        read_exact_at(input, &mut len_buf, &self.path, frame_start)?;
        let payload_len = u32::from_le_bytes(len_buf);
        let frame_len = u64::from(payload_len) + FRAME_OVERHEAD;

        if payload_len > self.max_record_bytes {
            return Err(corrupt(
                &self.path,
                frame_start,
                None,
                format!(
                    "record length {} exceeds limit {}",
                    payload_len, self.max_record_bytes
                ),
            ));
        }
        if frame_len > remaining {
            return Err(corrupt(
                &self.path,
                frame_start,
                None,
                format!(
                    "record length {} exceeds remaining {} bytes",
                    payload_len,
                    remaining - FRAME_OVERHEAD
                ),
            ));
        }

        let mut payload = vec![0u8; payload_len as usize];
        read_exact_at(input, &mut payload, &self.path, frame_start)?;
        let mut crc_buf = [0u8; 4];
        read_exact_at(input, &mut crc_buf, &self.path, frame_start)?;

        let next_frame = frame_start + frame_len;

        let stored = u32::from_le_bytes(crc_buf);
        let computed = payload_checksum(&payload);
        if stored != computed {
            return Err(corrupt(
                &self.path,
                frame_start,
                Some(next_frame),
                format!(
                    "checksum mismatch: stored {:#010x}, computed {:#010x}",
                    stored, computed
                ),
            ));
        }

        let record = codec::decode(&payload, &self.schema).map_err(|e| {
            corrupt(&self.path, frame_start, Some(next_frame), e.to_string())
        })?;

        Ok((record, next_frame))
    }

    /// Reads every remaining record, failing on the first error.
    pub fn read_all(&mut self) -> ContainerResult<Vec<Record>> {
        let mut records = Vec::new();
        while self.has_next() {
            records.push(self.next_record()?);
        }
        Ok(records)
    }

    /// Moves the cursor to `offset`, typically the `resume_offset` of a
    /// `CorruptRecord` error.
    ///
    /// # Errors
    ///
    /// `ContainerError::InvalidOffset` if `offset` lies in the header or past
    /// the end of file.
    pub fn resume_at(&mut self, offset: u64) -> ContainerResult<()> {
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| ContainerError::closed(&self.path))?;

        if offset < self.data_start || offset > self.file_size {
            return Err(ContainerError::InvalidOffset {
                offset,
                start: self.data_start,
                end: self.file_size,
            });
        }

        input
            .seek(SeekFrom::Start(offset))
            .map_err(|e| ContainerError::io(&self.path, e))?;
        self.offset = offset;
        self.failed = false;
        Ok(())
    }

    /// Releases the file handle. Idempotent; never fails.
    pub fn close(&mut self) {
        if self.input.take().is_some() {
            info!(
                path = %self.path.display(),
                records = self.records_read,
                "closed container reader"
            );
        }
    }
}

impl Iterator for ContainerReader {
    type Item = ContainerResult<Record>;

    /// Yields records until end of file; stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.has_next() {
            return None;
        }

        let result = self.next_record();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

fn read_exact_at(
    input: &mut BufReader<File>,
    buf: &mut [u8],
    path: &Path,
    frame_start: u64,
) -> ContainerResult<()> {
    input.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            // File shrank underneath us
            ContainerError::corrupt_record(frame_start, None, "unexpected end of file")
        } else {
            ContainerError::io(path, e)
        }
    })
}

fn corrupt(path: &Path, offset: u64, resume_offset: Option<u64>, reason: String) -> ContainerError {
    warn!(
        path = %path.display(),
        offset,
        resume_offset = ?resume_offset,
        reason = %reason,
        "corrupt record frame"
    );
    ContainerError::corrupt_record(offset, resume_offset, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerWriter;
    use crate::record::{RecordBuilder, Value};
    use crate::schema::{FieldSpec, FieldType};
    use std::fs;
    use tempfile::TempDir;

    fn write_points(path: &Path, count: i32) -> Vec<u64> {
        let schema = Arc::new(
            Schema::new(
                "Point",
                vec![
                    FieldSpec::new("x", FieldType::Int32),
                    FieldSpec::new("y", FieldType::Int32),
                ],
            )
            .unwrap(),
        );
        let mut writer = ContainerWriter::create(path, schema.clone()).unwrap();
        let mut offsets = Vec::new();
        for i in 0..count {
            let mut builder = RecordBuilder::new(schema.clone());
            builder.set("x", i).unwrap().set("y", -i).unwrap();
            offsets.push(writer.append(&builder.build().unwrap()).unwrap());
        }
        writer.close().unwrap();
        offsets
    }

    #[test]
    fn test_reads_in_order_then_exhausted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        write_points(&path, 3);

        let mut reader = ContainerReader::open(&path).unwrap();
        for i in 0..3 {
            assert!(reader.has_next());
            let record = reader.next_record().unwrap();
            assert_eq!(record.get("x").and_then(Value::as_i32), Some(i));
        }
        assert!(!reader.has_next());

        let err = reader.next_record().unwrap_err();
        assert_eq!(err.code(), "AERO_CONTAINER_EXHAUSTED");
        assert_eq!(reader.records_read(), 3);
    }

    #[test]
    fn test_empty_container() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        write_points(&path, 0);

        let mut reader = ContainerReader::open(&path).unwrap();
        assert!(!reader.has_next());
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_checksum_failure_keeps_cursor_and_allows_resume() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        let offsets = write_points(&path, 3);

        // Flip one payload bit of the second frame
        let mut bytes = fs::read(&path).unwrap();
        bytes[offsets[1] as usize + 4] ^= 0x01;
        fs::write(&path, &bytes).unwrap();

        let mut reader = ContainerReader::open(&path).unwrap();
        reader.next_record().unwrap();

        let err = reader.next_record().unwrap_err();
        assert_eq!(err.code(), "AERO_CORRUPT_RECORD");
        assert_eq!(err.resume_offset(), Some(offsets[2]));
        assert_eq!(reader.current_offset(), offsets[1]);

        // Retrying hits the same frame
        assert_eq!(reader.next_record().unwrap_err().code(), "AERO_CORRUPT_RECORD");

        reader.resume_at(offsets[2]).unwrap();
        let record = reader.next_record().unwrap();
        assert_eq!(record.get("x").and_then(Value::as_i32), Some(2));
        assert!(!reader.has_next());
    }

    #[test]
    fn test_oversized_length_has_no_resume_offset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        let offsets = write_points(&path, 2);

        let mut bytes = fs::read(&path).unwrap();
        let at = offsets[0] as usize;
        bytes[at..at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        fs::write(&path, &bytes).unwrap();

        let mut reader = ContainerReader::open(&path).unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, ContainerError::CorruptRecord { resume_offset: None, .. }));
    }

    #[test]
    fn test_truncated_tail_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        write_points(&path, 2);

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let mut reader = ContainerReader::open(&path).unwrap();
        reader.next_record().unwrap();
        assert!(reader.has_next());
        assert_eq!(reader.next_record().unwrap_err().code(), "AERO_CORRUPT_RECORD");
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        let offsets = write_points(&path, 3);

        let mut bytes = fs::read(&path).unwrap();
        bytes[offsets[1] as usize + 4] ^= 0xff;
        fs::write(&path, &bytes).unwrap();

        let results: Vec<_> = ContainerReader::open(&path).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_resume_at_rejects_header_offsets() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        write_points(&path, 1);

        let mut reader = ContainerReader::open(&path).unwrap();
        let err = reader.resume_at(0).unwrap_err();
        assert_eq!(err.code(), "AERO_INVALID_OFFSET");
    }

    #[test]
    fn test_close_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        write_points(&path, 1);

        let mut reader = ContainerReader::open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(!reader.has_next());
        assert_eq!(reader.next_record().unwrap_err().code(), "AERO_CONTAINER_CLOSED");
    }

    #[test]
    fn test_small_max_record_bytes_rejects_frame() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.arc");
        write_points(&path, 1);

        let config = ContainerConfig {
            max_record_bytes: 4,
            ..ContainerConfig::default()
        };
        let mut reader = ContainerReader::open_with_config(&path, &config).unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
    }
}
