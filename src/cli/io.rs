//! JSON I/O handling for CLI
//!
//! - Input: one JSON object per line, blank lines skipped
//! - Output: `{"status": "ok", "data": ...}` on stdout
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Reads JSON lines, yielding each with its 1-based line number.
pub fn read_requests<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<(usize, Value)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(CliError::from(e))),
            };
            if line.trim().is_empty() {
                return None;
            }
            Some(
                serde_json::from_str(&line)
                    .map(|value| (index + 1, value))
                    .map_err(|e| CliError::input_error(index + 1, e.to_string())),
            )
        })
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
