//! Plain-text numeric formats: one value per line.
//!
//! Leading and trailing whitespace is ignored and blank lines are skipped.
//! A line that does not parse is reported with its 1-based line number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{AuditError, Result};
use crate::walk::BitWidth;

/// Parse decimal floating-point p-values.
///
/// Range checking is left to the analyzers so that out-of-range values are
/// reported as a domain error rather than a syntax error.
pub fn parse_p_values<R: BufRead>(reader: R, origin: &str) -> Result<Vec<f64>> {
    parse_lines(reader, origin, |text| {
        text.parse::<f64>()
            .map_err(|_| "a decimal floating-point value".to_string())
    })
}

/// Parse non-negative integers that must fit in `bit_width` bits.
pub fn parse_raw_integers<R: BufRead>(
    reader: R,
    origin: &str,
    bit_width: BitWidth,
) -> Result<Vec<u64>> {
    parse_lines(reader, origin, |text| match text.parse::<u64>() {
        Ok(v) if v <= bit_width.max_value() => Ok(v),
        _ => Err(format!("an unsigned {bit_width}-bit integer")),
    })
}

/// Read a p-value file.
pub fn read_p_values(path: &Path) -> Result<Vec<f64>> {
    let origin = path.display().to_string();
    parse_p_values(open(path)?, &origin)
}

/// Read a file of raw generator output.
pub fn read_raw_integers(path: &Path, bit_width: BitWidth) -> Result<Vec<u64>> {
    let origin = path.display().to_string();
    parse_raw_integers(open(path)?, &origin, bit_width)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| AuditError::upstream(path.display().to_string(), e.to_string()))
}

fn parse_lines<R, T, F>(reader: R, origin: &str, parse: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: Fn(&str) -> std::result::Result<T, String>,
{
    let mut values = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AuditError::upstream(origin, e.to_string()))?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let value = parse(text).map_err(|expected| {
            AuditError::invalid_input(format!("{origin} line {}", i + 1), text, expected)
        })?;
        values.push(value);
    }
    Ok(values)
}
