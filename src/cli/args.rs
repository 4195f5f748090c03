//! CLI argument definitions using clap
//!
//! Commands:
//! - aerorecord schema <file>
//! - aerorecord meta <file>
//! - aerorecord cat <file> [--limit N]
//! - aerorecord count <file>
//! - aerorecord import --schema <path> --input <path> --output <path> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aerorecord - inspect and build self-describing record containers
#[derive(Parser, Debug)]
#[command(name = "aerorecord")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the schema embedded in a container
    Schema {
        /// Container file
        file: PathBuf,
    },

    /// Print header metadata as a JSON object
    Meta {
        /// Container file
        file: PathBuf,
    },

    /// Print records as JSON lines
    Cat {
        /// Container file
        file: PathBuf,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Print the number of records
    Count {
        /// Container file
        file: PathBuf,
    },

    /// Build a container from JSON lines
    Import {
        /// Schema JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Input file with one JSON object per line
        #[arg(long)]
        input: PathBuf,

        /// Container file to create
        #[arg(long)]
        output: PathBuf,

        /// Optional container config JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
