//! JSON I/O handling for CLI
//!
//! - Input: one JSON document per file, `-` for stdin
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON document from a file, or from stdin when the path is `-`
pub fn read_json(path: &Path) -> CliResult<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)
            .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?
    };

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
