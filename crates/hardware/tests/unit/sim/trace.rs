//! Trace Format Tests.
//!
//! Verifies the line parser, comment handling, error positions, and the
//! file loader.

use std::io::Write;

use a9sim_core::sim::trace::{load_trace, parse_line, read_trace, TraceEvent};
use a9sim_core::SimError;

/// Each record kind parses into its event.
#[test]
fn record_kinds() {
    assert_eq!(
        parse_line("I 0x10000 0xE5912034", 1).expect("parses"),
        Some(TraceEvent::Insn {
            vaddr: 0x10000,
            word: 0xE591_2034
        })
    );
    assert_eq!(
        parse_line("M 0x20040 L", 1).expect("parses"),
        Some(TraceEvent::Mem {
            vaddr: 0x20040,
            store: false
        })
    );
    assert_eq!(
        parse_line("M 8256 S", 1).expect("parses"),
        Some(TraceEvent::Mem {
            vaddr: 8256,
            store: true
        })
    );
    assert_eq!(
        parse_line("R 11 0x40000050", 1).expect("parses"),
        Some(TraceEvent::Reg {
            index: 11,
            value: 0x4000_0050
        })
    );
}

/// Blank lines and comments are skipped, including trailing comments.
#[test]
fn comments_and_blanks() {
    assert_eq!(parse_line("", 1).expect("blank"), None);
    assert_eq!(parse_line("   ", 1).expect("spaces"), None);
    assert_eq!(parse_line("# reset vector", 1).expect("comment"), None);
    assert_eq!(
        parse_line("M 0x100 S  # store to the stack", 1).expect("parses"),
        Some(TraceEvent::Mem {
            vaddr: 0x100,
            store: true
        })
    );
}

/// Malformed records carry their line number.
#[test]
fn errors_carry_line_numbers() {
    let cases = [
        "I 0x10000",             // missing word
        "I 0x10000 0x123456789", // word too wide
        "M 0x100 X",             // bad direction
        "R 16 0",                // register index out of range
        "Q 1 2",                 // unknown kind
        "M 0x100 L extra",       // trailing fields
    ];
    for text in cases {
        match parse_line(text, 42) {
            Err(SimError::Trace { line, .. }) => assert_eq!(line, 42, "{text:?}"),
            other => panic!("{text:?} should fail to parse, got {other:?}"),
        }
    }
}

/// `read_trace` collects events in order and reports the failing line.
#[test]
fn read_trace_collects_in_order() {
    let text = "\
# boot
I 0x10000 0xE5912034
M 0x20040 L

R 3 7
";
    let events = read_trace(text.as_bytes()).expect("parses");
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], TraceEvent::Insn { .. }));
    assert!(matches!(events[2], TraceEvent::Reg { index: 3, value: 7 }));

    let bad = "I 0x10000 0xE5912034\nbogus line\n";
    match read_trace(bad.as_bytes()) {
        Err(SimError::Trace { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a trace error, got {other:?}"),
    }
}

/// The loader reads a trace from disk.
#[test]
fn load_trace_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "I 0x10000 0xE5912034").expect("write");
    writeln!(file, "M 0x20040 S").expect("write");
    file.flush().expect("flush");

    let events = load_trace(file.path()).expect("loads");
    assert_eq!(events.len(), 2);
}

/// A missing file is a link-level error, not a panic.
#[test]
fn load_trace_missing_file() {
    let result = load_trace(std::path::Path::new("/nonexistent/trace.txt"));
    assert!(matches!(result, Err(SimError::Link(_))));
}
