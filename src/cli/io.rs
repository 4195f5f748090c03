//! JSON lines I/O for the CLI
//!
//! - Input: one JSON object per line, UTF-8; blank lines are skipped
//! - Output: one compact JSON value per line

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde_json::Value as JsonValue;

use super::errors::{CliError, CliResult};

/// Reads JSON values from `path`, one per non-blank line, paired with their
/// 1-based line number.
pub fn read_json_lines(path: &Path) -> CliResult<impl Iterator<Item = CliResult<(usize, JsonValue)>>> {
    let file = File::open(path)?;
    let display = path.display().to_string();

    Ok(BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(move |(index, line)| {
            let line_no = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(CliError::from(e))),
            };
            if line.trim().is_empty() {
                return None;
            }
            Some(
                serde_json::from_str(&line)
                    .map(|value| (line_no, value))
                    .map_err(|source| CliError::Json {
                        path: display.clone(),
                        line: line_no,
                        source,
                    }),
            )
        }))
}

/// Writes one compact JSON value followed by a newline
pub fn write_json_line<W: Write>(out: &mut W, value: &JsonValue) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
