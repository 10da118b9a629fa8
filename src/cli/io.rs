//! JSON I/O handling for the CLI
//!
//! - Input: one JSON document on stdin, data files as JSON arrays
//! - Output: one JSON response object per command on stdout

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read one JSON document from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

pub(crate) fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Read a data file holding a JSON array of documents
pub fn read_documents(path: &Path) -> CliResult<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("Failed to read data file {}: {}", path.display(), e))
    })?;
    match serde_json::from_str(&content)? {
        Value::Array(items) => Ok(items),
        _ => Err(CliError::data_error(format!(
            "Data file {} must hold a JSON array",
            path.display()
        ))),
    }
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&json!({"status": "ok", "data": data}))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_value(&json!({"status": "error", "code": code, "message": message}))
}

fn write_value(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
