//! JSON I/O handling for CLI
//!
//! - Input: one JSON document from a file or stdin
//! - Output: one pretty-printed JSON document on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON document from `path`, or from stdin when `path` is "-"
pub fn read_input(path: &Path) -> CliResult<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        })?
    };

    parse_input(&content)
}

/// Decode a JSON document
pub fn parse_input(content: &str) -> CliResult<Value> {
    if content.trim().is_empty() {
        return Err(CliError::input_error("Empty input"));
    }
    let value: Value = serde_json::from_str(content)?;
    Ok(value)
}

/// Write a JSON document to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
