//! Replay trace parsing.
//!
//! With the binary-translation host out of scope, the repository replays
//! recorded guest events from a line-oriented text format:
//!
//! ```text
//! # comment
//! I 0x10000 0xE59F1000      # instruction executed at vaddr, raw word
//! M 0x20040 L               # data load at effective address
//! M 0x20044 S               # data store at effective address
//! R 11 0x40000050           # guest register r11 now holds this value
//! ```
//!
//! Addresses and values accept `0x`-prefixed hex or plain decimal. Blank
//! lines and `#` comments are skipped. Event order is the guest's
//! retirement order, which is what makes replays deterministic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::common::{ArchWord, SimError};

/// Number of guest general registers an `R` record may name.
const NUM_REGISTERS: u8 = 16;

/// One guest-visible event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// An instruction executed at `vaddr` with the given 32-bit encoding.
    Insn {
        /// Virtual address of the instruction.
        vaddr: u64,
        /// Raw little-endian instruction word.
        word: u32,
    },
    /// A data access at its resolved effective address.
    Mem {
        /// Effective address of the access.
        vaddr: u64,
        /// True for a store, false for a load.
        store: bool,
    },
    /// A guest register changed value (feeds DCISW payload reads).
    Reg {
        /// Register index (0-15).
        index: u8,
        /// New register value.
        value: ArchWord,
    },
}

/// Parses an integer token, accepting `0x` hex or decimal.
fn parse_num(token: &str) -> Option<u64> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}

/// Builds the parse error for a line.
fn bad_line(number: usize, reason: impl Into<String>) -> SimError {
    SimError::Trace {
        line: number,
        reason: reason.into(),
    }
}

/// Parses one trace line. Returns `Ok(None)` for blanks and comments.
///
/// # Errors
///
/// [`SimError::Trace`] with the line number for any malformed record.
pub fn parse_line(text: &str, number: usize) -> Result<Option<TraceEvent>, SimError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    // strip a trailing comment
    let text = text.split('#').next().unwrap_or("").trim();

    let mut fields = text.split_whitespace();
    let kind = fields.next().ok_or_else(|| bad_line(number, "empty record"))?;
    let event = match kind {
        "I" => {
            let vaddr = fields
                .next()
                .and_then(parse_num)
                .ok_or_else(|| bad_line(number, "bad instruction address"))?;
            let word = fields
                .next()
                .and_then(parse_num)
                .filter(|w| *w <= u32::MAX as u64)
                .ok_or_else(|| bad_line(number, "bad instruction word"))?;
            TraceEvent::Insn {
                vaddr,
                word: word as u32,
            }
        }
        "M" => {
            let vaddr = fields
                .next()
                .and_then(parse_num)
                .ok_or_else(|| bad_line(number, "bad access address"))?;
            let store = match fields.next() {
                Some("L") => false,
                Some("S") => true,
                _ => return Err(bad_line(number, "access direction must be L or S")),
            };
            TraceEvent::Mem { vaddr, store }
        }
        "R" => {
            let index = fields
                .next()
                .and_then(parse_num)
                .filter(|i| *i < NUM_REGISTERS as u64)
                .ok_or_else(|| bad_line(number, "bad register index"))?;
            let value = fields
                .next()
                .and_then(parse_num)
                .filter(|v| *v <= u32::MAX as u64)
                .ok_or_else(|| bad_line(number, "bad register value"))?;
            TraceEvent::Reg {
                index: index as u8,
                value: value as ArchWord,
            }
        }
        other => return Err(bad_line(number, format!("unknown record kind {other:?}"))),
    };

    if fields.next().is_some() {
        return Err(bad_line(number, "trailing fields"));
    }
    Ok(Some(event))
}

/// Reads a full trace from any buffered reader.
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>, SimError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        if let Some(event) = parse_line(&line?, idx + 1)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Loads a trace file from disk.
pub fn load_trace(path: &Path) -> Result<Vec<TraceEvent>, SimError> {
    let events = read_trace(BufReader::new(File::open(path)?))?;
    info!("loaded {} trace events from {}", events.len(), path.display());
    Ok(events)
}
