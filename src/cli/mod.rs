//! CLI module for aerorecord
//!
//! Provides command-line interface for:
//! - schema: Print the embedded schema
//! - meta: Print header metadata
//! - cat: Dump records as JSON lines
//! - count: Count records
//! - import: Build a container from JSON lines

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{cat, count, import, meta, run, run_command, schema};
pub use errors::{CliError, CliResult};
