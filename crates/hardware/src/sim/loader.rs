//! Trace Loader.
//!
//! Reads access traces for batch runs. One request per line:
//!
//! ```text
//! # comment
//! R 0x20          read the word at 0x20
//! W 0x24 0xbeef   write 0xbeef at 0x24
//! ```
//!
//! Operations are case-insensitive; numbers are decimal or `0x` hex and may
//! contain `_` separators. Text after `#` is ignored.

use std::fs;
use std::path::Path;

use super::simulator::Access;
use crate::common::SimError;

/// Parses a trace from text.
///
/// # Errors
///
/// Returns `SimError::Trace` naming the first malformed line.
pub fn parse_trace(text: &str) -> Result<Vec<Access>, SimError> {
    let mut accesses = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        let fail = |reason: String| SimError::Trace { line, reason };

        let access = match fields.as_slice() {
            [op, addr] if op.eq_ignore_ascii_case("r") => Access::Read(parse_number(addr).map_err(fail)?),
            [op, addr, data] if op.eq_ignore_ascii_case("w") => {
                let address = parse_number(addr).map_err(fail)?;
                let value = parse_number(data).map_err(fail)?;
                let data = u32::try_from(value)
                    .map_err(|_| fail(format!("data {value:#x} does not fit in a 32-bit word")))?;
                Access::Write { address, data }
            }
            [op, ..] if op.eq_ignore_ascii_case("r") => {
                return Err(fail("read takes exactly one operand: R <addr>".to_string()));
            }
            [op, ..] if op.eq_ignore_ascii_case("w") => {
                return Err(fail("write takes exactly two operands: W <addr> <data>".to_string()));
            }
            [op, ..] => return Err(fail(format!("unknown operation '{op}'"))),
            [] => continue,
        };
        accesses.push(access);
    }
    Ok(accesses)
}

/// Reads and parses a trace file.
///
/// # Errors
///
/// Returns `SimError::Io` if the file cannot be read, or `SimError::Trace`
/// for a malformed line.
pub fn load_trace(path: &Path) -> Result<Vec<Access>, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_trace(&text)
}

fn parse_number(token: &str) -> Result<u64, String> {
    let cleaned = token.replace('_', "");
    let parsed = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cleaned.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid number '{token}': {e}"))
}
