//! Container error types
//!
//! Error codes:
//! - AERO_IO_ERROR (open/create, flush, read)
//! - AERO_CORRUPT_HEADER (open time)
//! - AERO_SCHEMA_MISMATCH (append time)
//! - AERO_RECORD_TOO_LARGE (append time)
//! - AERO_CORRUPT_RECORD (read time, fatal to the stream)
//! - AERO_CONTAINER_CLOSED
//! - AERO_CONTAINER_EXHAUSTED
//! - AERO_INVALID_METADATA
//! - AERO_INVALID_OFFSET
//! - AERO_CONFIG_ERROR

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::codec::CodecError;

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

#[derive(Debug, Error)]
pub enum ContainerError {
    /// Environment-level I/O failure
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Bad magic, truncated header, or unparsable schema/metadata
    #[error("corrupt container header in '{path}': {reason}")]
    CorruptHeader { path: String, reason: String },

    /// Appended record was built against a different schema
    #[error("record schema '{actual}' does not match container schema '{expected}': {detail}")]
    SchemaMismatch {
        expected: String,
        actual: String,
        detail: String,
    },

    /// Encoded record exceeds the frame size limit; nothing was written
    #[error("encoded record of {size} bytes exceeds limit {limit}")]
    RecordTooLarge { size: u64, limit: u32 },

    /// A framed record failed its length, checksum or decode checks.
    ///
    /// `resume_offset` is the start of the following frame when the bad
    /// frame's length could be trusted.
    #[error("corrupt record at byte offset {offset}: {reason}")]
    CorruptRecord {
        offset: u64,
        resume_offset: Option<u64>,
        reason: String,
    },

    /// Encoding failed at append time
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Operation on a closed handle
    #[error("container '{path}' is closed")]
    Closed { path: String },

    /// `next` called with no records remaining
    #[error("no more records in '{path}' after {records_read} records")]
    Exhausted { path: String, records_read: u64 },

    /// User metadata collides with reserved keys
    #[error("invalid metadata key '{key}': {reason}")]
    InvalidMetadata { key: String, reason: String },

    /// `resume_at` target outside the record region
    #[error("offset {offset} is outside the record region {start}..={end}")]
    InvalidOffset { offset: u64, start: u64, end: u64 },

    /// Configuration file could not be loaded
    #[error("failed to load config '{path}': {reason}")]
    Config { path: String, reason: String },
}

impl ContainerError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        ContainerError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn corrupt_header(path: &Path, reason: impl Into<String>) -> Self {
        ContainerError::CorruptHeader {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn corrupt_record(offset: u64, resume_offset: Option<u64>, reason: impl Into<String>) -> Self {
        ContainerError::CorruptRecord {
            offset,
            resume_offset,
            reason: reason.into(),
        }
    }

    pub fn closed(path: &Path) -> Self {
        ContainerError::Closed {
            path: path.display().to_string(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ContainerError::Io { .. } => "AERO_IO_ERROR",
            ContainerError::CorruptHeader { .. } => "AERO_CORRUPT_HEADER",
            ContainerError::SchemaMismatch { .. } => "AERO_SCHEMA_MISMATCH",
            ContainerError::RecordTooLarge { .. } => "AERO_RECORD_TOO_LARGE",
            ContainerError::CorruptRecord { .. } => "AERO_CORRUPT_RECORD",
            ContainerError::Codec(e) => e.code(),
            ContainerError::Closed { .. } => "AERO_CONTAINER_CLOSED",
            ContainerError::Exhausted { .. } => "AERO_CONTAINER_EXHAUSTED",
            ContainerError::InvalidMetadata { .. } => "AERO_INVALID_METADATA",
            ContainerError::InvalidOffset { .. } => "AERO_INVALID_OFFSET",
            ContainerError::Config { .. } => "AERO_CONFIG_ERROR",
        }
    }

    /// Offset a caller may resume reading from after a corrupt record
    pub fn resume_offset(&self) -> Option<u64> {
        match self {
            ContainerError::CorruptRecord { resume_offset, .. } => *resume_offset,
            _ => None,
        }
    }
}
