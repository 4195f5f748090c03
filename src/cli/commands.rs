//! CLI command implementations
//!
//! Each command writes to a caller-supplied sink so it can be driven from
//! tests as well as from `run`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};
use tracing::{info, warn};

use crate::container::{ContainerConfig, ContainerReader, ContainerWriter};
use crate::record::json::record_from_json;
use crate::schema::Schema;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_json_lines, write_json_line};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Run the appropriate command based on CLI args
pub fn run_command<W: Write>(cmd: Command, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Schema { file } => schema(&file, out),
        Command::Meta { file } => meta(&file, out),
        Command::Cat { file, limit } => cat(&file, limit, out),
        Command::Count { file } => count(&file, out),
        Command::Import {
            schema,
            input,
            output,
            config,
        } => import(&schema, &input, &output, config.as_deref(), out),
    }
}

/// Print the embedded writer schema as pretty JSON
pub fn schema<W: Write>(file: &Path, out: &mut W) -> CliResult<()> {
    let reader = ContainerReader::open(file)?;
    writeln!(out, "{}", reader.schema().to_pretty_json())?;
    Ok(())
}

/// Print header metadata. Non-UTF-8 values are shown lossily.
pub fn meta<W: Write>(file: &Path, out: &mut W) -> CliResult<()> {
    let reader = ContainerReader::open(file)?;
    let entries: Map<String, JsonValue> = reader
        .metadata()
        .iter()
        .map(|(key, value)| {
            (
                key.clone(),
                JsonValue::String(String::from_utf8_lossy(value).into_owned()),
            )
        })
        .collect();

    let text = serde_json::to_string_pretty(&JsonValue::Object(entries)).map_err(io::Error::from)?;
    writeln!(out, "{}", text)?;
    Ok(())
}

/// Print records as JSON lines, stopping after `limit` if given
pub fn cat<W: Write>(file: &Path, limit: Option<u64>, out: &mut W) -> CliResult<()> {
    let mut reader = ContainerReader::open(file)?;
    let mut printed = 0u64;

    while reader.has_next() && limit.map_or(true, |max| printed < max) {
        let record = reader.next_record()?;
        write_json_line(out, &record.to_json())?;
        printed += 1;
    }
    Ok(())
}

/// Print the number of records. Every record is decoded, so a corrupt
/// frame fails the count.
pub fn count<W: Write>(file: &Path, out: &mut W) -> CliResult<()> {
    let mut reader = ContainerReader::open(file)?;
    let mut total = 0u64;

    while reader.has_next() {
        reader.next_record()?;
        total += 1;
    }
    writeln!(out, "{}", total)?;
    Ok(())
}

/// Build a container at `output` from the JSON lines in `input`.
///
/// Each object goes through `RecordBuilder`, so unset fields take their
/// defaults and missing required fields fail the import with the offending
/// line number. A failed import removes `output` rather than leaving a
/// shorter container behind.
pub fn import<W: Write>(
    schema_path: &Path,
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    out: &mut W,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => ContainerConfig::load(path)?,
        None => ContainerConfig::default(),
    };
    let schema = Arc::new(Schema::from_file(schema_path)?);
    let lines = read_json_lines(input)?;

    let mut writer = ContainerWriter::create_with_config(output, schema.clone(), &config)?;
    if let Err(e) = write_lines(&mut writer, &schema, lines, input) {
        drop(writer);
        discard_output(output);
        return Err(e);
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        records = writer.records_written(),
        "import complete"
    );

    write_json_line(
        out,
        &json!({
            "imported": writer.records_written(),
            "output": output.display().to_string(),
        }),
    )
}

/// Appends every input line and closes the writer.
fn write_lines(
    writer: &mut ContainerWriter,
    schema: &Arc<Schema>,
    lines: impl Iterator<Item = CliResult<(usize, JsonValue)>>,
    input: &Path,
) -> CliResult<()> {
    for entry in lines {
        let (line, json) = entry?;
        let record = record_from_json(schema.clone(), &json).map_err(|source| CliError::Record {
            path: input.display().to_string(),
            line,
            source,
        })?;
        writer.append(&record)?;
    }
    writer.close()?;
    Ok(())
}

fn discard_output(output: &Path) {
    if let Err(e) = fs::remove_file(output) {
        warn!(
            output = %output.display(),
            error = %e,
            "failed to remove partial output"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{
        "name": "Person",
        "fields": [
            {"name": "name", "type": "string"},
            {"name": "age", "type": "int32", "default": 0}
        ]
    }"#;

    fn setup(lines: &str) -> (TempDir, PathBuf, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let schema_path = temp_dir.path().join("person.json");
        let input_path = temp_dir.path().join("people.jsonl");
        let output_path = temp_dir.path().join("people.arc");
        fs::write(&schema_path, SCHEMA).unwrap();
        fs::write(&input_path, lines).unwrap();
        (temp_dir, schema_path, input_path, output_path)
    }

    fn output_of(f: impl FnOnce(&mut Vec<u8>) -> CliResult<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_import_then_cat_and_count() {
        let (_dir, schema_path, input, output) =
            setup("{\"name\":\"Ada\",\"age\":36}\n{\"name\":\"Alan\"}\n");

        let report = output_of(|out| import(&schema_path, &input, &output, None, out));
        assert!(report.contains("\"imported\":2"));

        let lines = output_of(|out| cat(&output, None, out));
        assert_eq!(
            lines,
            "{\"name\":\"Ada\",\"age\":36}\n{\"name\":\"Alan\",\"age\":0}\n"
        );

        assert_eq!(output_of(|out| count(&output, out)), "2\n");
        assert_eq!(output_of(|out| cat(&output, Some(1), out)).lines().count(), 1);
    }

    #[test]
    fn test_import_reports_failing_line() {
        let (_dir, schema_path, input, output) = setup("{\"name\":\"Ada\"}\n{\"age\":3}\n");

        let err = import(&schema_path, &input, &output, None, &mut Vec::new()).unwrap_err();
        match err {
            CliError::Record { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_failed_import_leaves_no_output() {
        let (_dir, schema_path, input, output) =
            setup("{\"name\":\"Ada\"}\n{\"name\":\"Alan\"}\n{\"bad\":1}\n");

        let err = import(&schema_path, &input, &output, None, &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), "AERO_UNKNOWN_FIELD");
        assert!(!output.exists());
        assert!(count(&output, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_schema_and_meta_commands() {
        let (dir, schema_path, input, output) = setup("{\"name\":\"Ada\"}\n");
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{"sync_on_flush": false, "metadata": {"source": "test"}}"#)
            .unwrap();

        import(&schema_path, &input, &output, Some(&config_path), &mut Vec::new()).unwrap();

        let schema_text = output_of(|out| schema(&output, out));
        assert_eq!(
            Schema::parse(&schema_text).unwrap(),
            Schema::parse(SCHEMA).unwrap()
        );

        let meta_text = output_of(|out| meta(&output, out));
        let meta: JsonValue = serde_json::from_str(&meta_text).unwrap();
        assert_eq!(meta["source"], "test");
        assert!(meta["aerorecord.file_id"].is_string());
        assert!(meta["aerorecord.created_at"].is_string());
    }

    #[test]
    fn test_cat_missing_file() {
        let err = cat(Path::new("/nonexistent/x.arc"), None, &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), "AERO_IO_ERROR");
    }
}
