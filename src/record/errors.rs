//! Record construction errors
//!
//! Error codes:
//! - AERO_UNKNOWN_FIELD
//! - AERO_TYPE_MISMATCH
//! - AERO_VALIDATION_FAILED

use thiserror::Error;

/// Result type for record construction
pub type RecordResult<T> = Result<T, RecordError>;

/// Caller-input errors raised while building a record.
///
/// These are always surfaced; nothing is defaulted beyond the schema's
/// declared defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Field is not declared in the schema
    #[error("unknown field '{field}' in schema '{schema}'")]
    UnknownField { schema: String, field: String },

    /// Value's runtime type does not match the declared type
    #[error("field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Required field left unset
    #[error("record validation failed: field '{missing_field}' is not set and has no default")]
    Validation { missing_field: String },
}

impl RecordError {
    pub fn unknown_field(schema: impl Into<String>, field: impl Into<String>) -> Self {
        RecordError::UnknownField {
            schema: schema.into(),
            field: field.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        RecordError::Validation {
            missing_field: field.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::UnknownField { .. } => "AERO_UNKNOWN_FIELD",
            RecordError::TypeMismatch { .. } => "AERO_TYPE_MISMATCH",
            RecordError::Validation { .. } => "AERO_VALIDATION_FAILED",
        }
    }

    /// Name of the field the error concerns
    pub fn field(&self) -> &str {
        match self {
            RecordError::UnknownField { field, .. } | RecordError::TypeMismatch { field, .. } => {
                field
            }
            RecordError::Validation { missing_field } => missing_field,
        }
    }
}
