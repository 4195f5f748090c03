//! CLI-specific error types
//!
//! Every CLI error is fatal: `main` prints it and exits non-zero.

use std::io;

use thiserror::Error;

use crate::container::ContainerError;
use crate::record::RecordError;
use crate::schema::SchemaError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    /// An input line could not be built into a record
    #[error("{path}:{line}: {source}")]
    Record {
        path: String,
        line: usize,
        #[source]
        source: RecordError,
    },

    /// An input line is not valid JSON
    #[error("{path}:{line}: invalid JSON: {source}")]
    Json {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// stdin/stdout or input file failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Schema(e) => e.code(),
            CliError::Container(e) => e.code(),
            CliError::Record { source, .. } => source.code(),
            CliError::Json { .. } => "AERO_CLI_INVALID_JSON",
            CliError::Io(_) => "AERO_CLI_IO_ERROR",
        }
    }
}
