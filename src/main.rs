//! aerorecord CLI entry point
//!
//! Installs the log subscriber, delegates to `cli::run`, prints errors to
//! stderr and exits non-zero on failure. Logging goes to stderr so record
//! output on stdout stays machine-readable.

use aerorecord::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
