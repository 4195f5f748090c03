//! Schema error types
//!
//! Error codes:
//! - AERO_SCHEMA_PARSE_FAILED
//! - AERO_SCHEMA_IO

use std::io;

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while parsing or loading a schema.
///
/// A schema that fails to parse is never partially usable; callers must
/// fix the definition and parse again.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Malformed syntax, unknown type name, duplicate field, or bad default
    #[error("schema parse failed{}: {reason}", field_suffix(.field))]
    Parse {
        /// Field the failure was found in, if any
        field: Option<String>,
        /// Human-readable reason
        reason: String,
    },

    /// Schema file could not be read
    #[error("failed to read schema file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(" (field '{}')", name),
        None => String::new(),
    }
}

impl SchemaError {
    /// Parse failure not tied to a specific field
    pub fn parse(reason: impl Into<String>) -> Self {
        SchemaError::Parse {
            field: None,
            reason: reason.into(),
        }
    }

    /// Parse failure within a named field
    pub fn in_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Parse {
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    pub fn duplicate_field(field: impl Into<String>) -> Self {
        Self::in_field(field, "duplicate field name")
    }

    pub fn unknown_type(field: impl Into<String>, type_name: &str) -> Self {
        Self::in_field(field, format!("unknown type '{}'", type_name))
    }

    pub fn invalid_default(field: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::in_field(
            field,
            format!("default must be a {} literal, got {}", expected, actual),
        )
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Parse { .. } => "AERO_SCHEMA_PARSE_FAILED",
            SchemaError::Io { .. } => "AERO_SCHEMA_IO",
        }
    }

    /// Returns the offending field, if the error names one
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::Parse { field, .. } => field.as_deref(),
            SchemaError::Io { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_names_field() {
        let err = SchemaError::unknown_type("age", "int128");
        let display = err.to_string();
        assert!(display.contains("field 'age'"));
        assert!(display.contains("int128"));
        assert_eq!(err.code(), "AERO_SCHEMA_PARSE_FAILED");
        assert_eq!(err.field(), Some("age"));
    }

    #[test]
    fn test_parse_error_without_field() {
        let err = SchemaError::parse("expected a JSON object");
        assert_eq!(err.to_string(), "schema parse failed: expected a JSON object");
        assert!(err.field().is_none());
    }
}
