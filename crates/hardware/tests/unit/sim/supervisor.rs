//! Supervisor Link Protocol Tests.
//!
//! Verifies the framed-token wire format over in-memory streams: framing
//! in both directions, plan reception, and the report messages.

use a9sim_core::config::CacheTarget;
use a9sim_core::core::injector::InjectionEvent;
use a9sim_core::sim::SupervisorLink;
use a9sim_core::SimError;

use crate::common::mocks::stream::{frame_tokens, unframe_tokens, DuplexStream};

fn link_with_input(tokens: &[&str]) -> SupervisorLink<DuplexStream> {
    SupervisorLink::new(DuplexStream::new(frame_tokens(tokens)))
}

/// A sent token is framed with a 4-byte big-endian length prefix.
#[test]
fn send_frames_tokens() {
    let mut link = SupervisorLink::new(DuplexStream::new(Vec::new()));
    link.send_token("0x00000042").expect("send");

    let bytes = link.into_inner().output;
    assert_eq!(&bytes[..4], &[0, 0, 0, 10], "length prefix");
    assert_eq!(&bytes[4..], b"0x00000042");
}

/// Receiving undoes the framing.
#[test]
fn recv_unframes_tokens() {
    let mut link = link_with_input(&["100", "7"]);
    assert_eq!(link.recv_token().expect("first"), "100");
    assert_eq!(link.recv_u64().expect("second"), 7);
}

/// A truncated stream surfaces as a link error.
#[test]
fn truncated_stream_is_a_link_error() {
    let mut bytes = frame_tokens(&["100"]);
    bytes.truncate(5);
    let mut link = SupervisorLink::new(DuplexStream::new(bytes));
    assert!(matches!(link.recv_token(), Err(SimError::Link(_))));
}

/// A non-numeric token where a number is expected is a token error.
#[test]
fn malformed_number_is_a_token_error() {
    let mut link = link_with_input(&["not-a-number"]);
    assert!(matches!(link.recv_u64(), Err(SimError::Token(_))));
}

/// The plan arrives as sleep cycles, row, way, cache name, word.
#[test]
fn recv_plan_in_order() {
    let mut link = link_with_input(&["1000", "5", "2", "dcache", "3"]);
    let plan = link.recv_plan().expect("plan");

    assert_eq!(plan.sleep_cycles, 1000);
    assert_eq!(plan.row, 5);
    assert_eq!(plan.way, 2);
    assert_eq!(plan.cache, CacheTarget::DCache);
    assert_eq!(plan.word, 3);
}

/// An unknown cache name is rejected while receiving the plan.
#[test]
fn recv_plan_rejects_unknown_cache() {
    let mut link = link_with_input(&["1000", "5", "2", "l4cache", "3"]);
    assert!(matches!(
        link.recv_plan(),
        Err(SimError::UnknownCache(name)) if name == "l4cache"
    ));
}

/// The fire report is two eight-digit hex tokens: count, then address.
#[test]
fn fire_report_format() {
    let mut link = SupervisorLink::new(DuplexStream::new(Vec::new()));
    link.report_fire(&InjectionEvent {
        insn_count: 0x64,
        addr: 0x0001_70AC,
    })
    .expect("report");

    let tokens = unframe_tokens(&link.into_inner().output);
    assert_eq!(tokens, vec!["0x00000064", "0x000170AC"]);
}

/// Validity is a single `0`/`1` line; the final count carries a newline.
#[test]
fn validity_and_final_count_formats() {
    let mut link = SupervisorLink::new(DuplexStream::new(Vec::new()));
    link.report_validity(true).expect("validity");
    link.report_validity(false).expect("validity");
    link.report_final_count(0x1234).expect("final");

    let tokens = unframe_tokens(&link.into_inner().output);
    assert_eq!(tokens, vec!["1\n", "0\n", "0x00001234\n"]);
}
