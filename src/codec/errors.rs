//! Codec error types
//!
//! Error codes:
//! - AERO_ENCODE_FAILED
//! - AERO_DECODE_FAILED
//! - AERO_TRUNCATED_DATA
//!
//! All codec errors are data-integrity failures and fatal to the current
//! operation.

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value absent or of the wrong runtime type at encode time
    #[error("encode failed at field '{field}': {reason}")]
    Encode { field: String, reason: String },

    /// Structurally invalid input (bad length prefix, bad UTF-8, trailing bytes, ...)
    #[error("decode failed at field '{field}', byte offset {offset}: {reason}")]
    Decode {
        field: String,
        offset: usize,
        reason: String,
    },

    /// Input ended in the middle of a field
    #[error("truncated data at field '{field}', byte offset {offset}: needed {needed} more bytes")]
    Truncated {
        field: String,
        offset: usize,
        needed: usize,
    },
}

impl CodecError {
    pub fn encode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Encode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(field: impl Into<String>, offset: usize, reason: impl Into<String>) -> Self {
        CodecError::Decode {
            field: field.into(),
            offset,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Encode { .. } => "AERO_ENCODE_FAILED",
            CodecError::Decode { .. } => "AERO_DECODE_FAILED",
            CodecError::Truncated { .. } => "AERO_TRUNCATED_DATA",
        }
    }

    /// Field being processed when the error occurred
    pub fn field(&self) -> &str {
        match self {
            CodecError::Encode { field, .. }
            | CodecError::Decode { field, .. }
            | CodecError::Truncated { field, .. } => field,
        }
    }
}
