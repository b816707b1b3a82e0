//! Synchronization Primitive Decode Tests (A5-205).
//!
//! SWP/SWPB and the exclusive family, including the swap's combined
//! load-and-store direction.

use a9sim_core::isa::sync::SyncOp;
use a9sim_core::isa::{classify, Decoded, Direction};

use crate::common::builder::insn;

/// Classifies and unwraps a synchronization primitive.
fn decode_sync(word: u32) -> a9sim_core::isa::sync::SyncAccess {
    match classify(word) {
        Decoded::Sync(access) => access,
        other => panic!("expected a synchronization primitive, got {other:?}"),
    }
}

/// SWP moves data both ways in one instruction.
#[test]
fn swap_is_load_and_store() {
    let access = decode_sync(insn::swp(1, 2, 3));

    assert_eq!(access.op, SyncOp::SwpWord);
    assert_eq!(access.op.direction(), Direction::LoadStore);
    assert_eq!(access.rt, 1);
    assert_eq!(access.rm, 2);
    assert_eq!(access.rn, 3);
}

/// SWPB is the byte swap.
#[test]
fn swap_byte() {
    assert_eq!(decode_sync(insn::swpb(1, 2, 3)).op, SyncOp::SwpByte);
}

/// LDREX is a load, STREX a store.
#[test]
fn exclusive_pair() {
    let ldrex = decode_sync(insn::ldrex(4, 5));
    assert_eq!(ldrex.op, SyncOp::Ldrex);
    assert_eq!(ldrex.op.direction(), Direction::Load);
    assert_eq!(ldrex.rt, 4);
    assert_eq!(ldrex.rn, 5);

    let strex = decode_sync(insn::strex(0, 4, 5));
    assert_eq!(strex.op, SyncOp::Strex);
    assert_eq!(strex.op.direction(), Direction::Store);
}

/// The sized exclusive variants decode by their opcode row.
#[test]
fn sized_exclusives() {
    // ldrexb r0, [r1] / ldrexh r0, [r1] / ldrexd r0, r1, [r2]
    assert_eq!(decode_sync(0xE1D1_0F9F).op, SyncOp::Ldrexb);
    assert_eq!(decode_sync(0xE1F1_0F9F).op, SyncOp::Ldrexh);
    assert_eq!(decode_sync(0xE1B2_0F9F).op, SyncOp::Ldrexd);
    // strexb r0, r2, [r1] / strexh / strexd
    assert_eq!(decode_sync(0xE1C1_0F92).op, SyncOp::Strexb);
    assert_eq!(decode_sync(0xE1E1_0F92).op, SyncOp::Strexh);
    assert_eq!(decode_sync(0xE1A1_0F92).op, SyncOp::Strexd);
}

/// The swap rows with other opcode bits are reserved, not memory ops.
#[test]
fn reserved_rows_are_other() {
    // op bits 0001 in the sync space
    let word = 0xE110_0090u32;
    assert!(matches!(classify(word), Decoded::Other));
}
