//! Container writer
//!
//! Lifecycle: `create` writes the header and enters Writing; `append` buffers
//! framed records; `flush` pushes them to the OS and (by default) fsyncs;
//! `close` flushes and releases the file. `close` is idempotent and any
//! append afterwards fails.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::codec;
use crate::record::Record;
use crate::schema::Schema;

use super::config::ContainerConfig;
use super::errors::{ContainerError, ContainerResult};
use super::frame::{write_frame, Header, META_CREATED_AT, META_FILE_ID};

/// Append-only writer for one container file.
///
/// Not internally synchronized; one writer per file.
pub struct ContainerWriter {
    path: PathBuf,
    schema: Arc<Schema>,
    /// `None` once finalized
    out: Option<BufWriter<File>>,
    sync_on_flush: bool,
    /// Largest payload a reader with the same config accepts
    max_record_bytes: u32,
    /// Offset where the next frame starts
    offset: u64,
    records_written: u64,
    /// Reused encode buffer
    scratch: Vec<u8>,
    frame: Vec<u8>,
}

impl ContainerWriter {
    /// Creates (or truncates) a container at `path` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::Io` if the file cannot be created or the
    /// header cannot be written.
    pub fn create(path: &Path, schema: impl Into<Arc<Schema>>) -> ContainerResult<Self> {
        Self::create_with_config(path, schema, &ContainerConfig::default())
    }

    /// Creates a container using `config` for buffering, sync and metadata.
    pub fn create_with_config(
        path: &Path,
        schema: impl Into<Arc<Schema>>,
        config: &ContainerConfig,
    ) -> ContainerResult<Self> {
        config.validate()?;
        let schema = schema.into();

        let mut metadata: BTreeMap<String, Vec<u8>> = config
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into_bytes()))
            .collect();
        metadata.insert(
            META_FILE_ID.to_string(),
            Uuid::new_v4().to_string().into_bytes(),
        );
        metadata.insert(
            META_CREATED_AT.to_string(),
            Utc::now()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into_bytes(),
        );

        let header = Header {
            schema: Schema::clone(&schema),
            metadata,
        }
        .encode();

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| ContainerError::io(path, e))?;

        let mut out = BufWriter::with_capacity(config.buffer_capacity, file);
        out.write_all(&header)
            .map_err(|e| ContainerError::io(path, e))?;

        info!(
            path = %path.display(),
            schema = %schema.full_name(),
            "created container"
        );

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            out: Some(out),
            sync_on_flush: config.sync_on_flush,
            max_record_bytes: config.max_record_bytes,
            offset: header.len() as u64,
            records_written: 0,
            scratch: Vec::new(),
            frame: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema embedded in this container
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn is_closed(&self) -> bool {
        self.out.is_none()
    }

    /// Encodes and appends one record, returning the byte offset of its frame.
    ///
    /// The record is buffered; call `flush` to push it to storage.
    ///
    /// # Errors
    ///
    /// - `ContainerError::Closed` after `close`
    /// - `ContainerError::SchemaMismatch` if the record's schema differs
    ///   structurally from the container's
    /// - `ContainerError::Codec` if encoding fails
    /// - `ContainerError::RecordTooLarge` if the encoded record exceeds
    ///   `max_record_bytes`; nothing is written
    /// - `ContainerError::Io` if the buffered write fails
    pub fn append(&mut self, record: &Record) -> ContainerResult<u64> {
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| ContainerError::closed(&self.path))?;

        if !Arc::ptr_eq(record.schema(), &self.schema) && **record.schema() != *self.schema {
            return Err(ContainerError::SchemaMismatch {
                expected: self.schema.full_name(),
                actual: record.schema().full_name(),
                detail: self
                    .schema
                    .first_difference(record.schema())
                    .unwrap_or_default(),
            });
        }

        self.scratch.clear();
        codec::encode_into(record, &self.schema, &mut self.scratch)?;

        let payload_len = u32::try_from(self.scratch.len())
            .ok()
            .filter(|len| *len <= self.max_record_bytes)
            .ok_or(ContainerError::RecordTooLarge {
                size: self.scratch.len() as u64,
                limit: self.max_record_bytes,
            })?;

        self.frame.clear();
        write_frame(&mut self.frame, payload_len, &self.scratch);
        out.write_all(&self.frame).map_err(|e| {
            ContainerError::io(&self.path, e)
        })?;

        let frame_offset = self.offset;
        self.offset += self.frame.len() as u64;
        self.records_written += 1;
        Ok(frame_offset)
    }

    /// Appends every record in order, stopping at the first error.
    pub fn append_all<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) -> ContainerResult<()> {
        for record in records {
            self.append(record)?;
        }
        Ok(())
    }

    /// Pushes buffered bytes to the OS and, if configured, fsyncs.
    pub fn flush(&mut self) -> ContainerResult<()> {
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| ContainerError::closed(&self.path))?;

        out.flush().map_err(|e| ContainerError::io(&self.path, e))?;
        if self.sync_on_flush {
            out.get_ref()
                .sync_all()
                .map_err(|e| ContainerError::io(&self.path, e))?;
        }

        debug!(
            path = %self.path.display(),
            records = self.records_written,
            bytes = self.offset,
            "flushed container"
        );
        Ok(())
    }

    /// Flushes and finalizes the container, releasing the file handle.
    ///
    /// Idempotent. If the final flush fails the writer stays open so the
    /// caller can retry or drop it.
    pub fn close(&mut self) -> ContainerResult<()> {
        if self.out.is_none() {
            return Ok(());
        }

        self.flush()?;
        self.out = None;

        info!(
            path = %self.path.display(),
            records = self.records_written,
            bytes = self.offset,
            "closed container"
        );
        Ok(())
    }
}
