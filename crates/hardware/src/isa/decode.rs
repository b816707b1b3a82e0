//! Top-level instruction classification.
//!
//! This module implements the first level of ARM ARM Table A5-1: the `op1`
//! field at bits 27-25 and the `op` bit at bit 4 route an instruction word
//! to the per-class decoders.
//!
//! | `op1` | `op` | class |
//! |---|---|---|
//! | `010` | x | regular load/store word/byte |
//! | `011` | 0 | regular load/store word/byte |
//! | `011` | 1 | media (not a memory access here) |
//! | `00x` | - | data processing / misc; may hold extra load/store or a synchronization primitive |
//! | `10x` | - | branch, branch-with-link, or block data transfer |
//! | `11x` | - | coprocessor load/store, register transfer, supervisor call |
//!
//! Input arrives as raw little-endian bytes exactly as the translation host
//! hands them over; anything other than 4 bytes is a Thumb or AArch64
//! encoding and is refused.

use crate::common::SimError;

use super::bits::InstructionBits;
use super::block::{self, BlockTransfer};
use super::coproc::{self, CoprocAccess};
use super::extra::{self, ExtraAccess};
use super::regular::{self, RegularAccess};
use super::sync::{self, SyncAccess};
use super::Direction;

/// Width of one A32 instruction in bytes.
const INSN_BYTES: usize = 4;

/// A classified instruction, tagged by the memory-traffic category it
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Regular load/store word or unsigned byte.
    Regular(RegularAccess),
    /// Extra load/store (halfword, dual, signed).
    Extra(ExtraAccess),
    /// Block (multiple-register) transfer.
    Block(BlockTransfer),
    /// Coprocessor load/store or register transfer.
    Coproc(CoprocAccess),
    /// Synchronization primitive.
    Sync(SyncAccess),
    /// Anything that generates no modeled memory traffic: data processing,
    /// branches, media, supervisor calls, floating-point coprocessors.
    Other,
}

impl Decoded {
    /// The direction of the data traffic, if this instruction accesses
    /// memory. MCR/MRC and non-memory instructions return `None`.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Decoded::Regular(a) => Some(a.op.direction()),
            Decoded::Extra(a) => Some(a.op.direction()),
            Decoded::Block(a) => Some(a.op.direction()),
            Decoded::Coproc(a) => a.op.direction(),
            Decoded::Sync(a) => Some(a.op.direction()),
            Decoded::Other => None,
        }
    }

    /// True when the instruction generates data-side memory traffic.
    pub fn is_memory_access(&self) -> bool {
        self.direction().is_some()
    }
}

/// Sub-classes of the data-processing-and-miscellaneous space that carry
/// memory traffic (ARM ARM Table A5-2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MiscClass {
    /// Extra load/store (A5-203).
    Extra,
    /// Extra load/store, unprivileged (A5-204).
    ExtraUnpriv,
    /// Synchronization primitive (A5-205).
    Sync,
}

/// Discriminates the `op1 = 0b000` space by the `op1`/`op2` patterns of
/// Table A5-2. Returns `None` for data processing, multiplies, and the
/// other non-memory residents of the space.
fn misc_class(word: u32) -> Option<MiscClass> {
    let op1 = word.ldst_op1();
    let op2 = word.misc_op2();

    if (op1 & 0x12) != 0x02 && (op2 == 0xB || op2 & 0xD == 0xD) {
        Some(MiscClass::Extra)
    } else if op1 & 0x13 == 0x02 && op2 & 0xD == 0xD {
        Some(MiscClass::Extra)
    } else if op1 & 0x12 == 0x02 && op2 == 0xB {
        Some(MiscClass::ExtraUnpriv)
    } else if op1 & 0x13 == 0x03 && op2 & 0xD == 0xD {
        Some(MiscClass::ExtraUnpriv)
    } else if op1 & 0x10 == 0x10 && op2 == 0x9 {
        Some(MiscClass::Sync)
    } else {
        None
    }
}

/// Classifies an already-assembled instruction word.
pub fn classify(word: u32) -> Decoded {
    match word.class_op1() {
        0b010 => Decoded::Regular(regular::decode(word)),
        0b011 if word.class_op() == 0 => Decoded::Regular(regular::decode(word)),
        // media instructions share the 011/1 slot but touch no memory here
        0b011 => Decoded::Other,
        0b000 => match misc_class(word) {
            Some(MiscClass::Extra) | Some(MiscClass::ExtraUnpriv) => {
                extra::decode(word).map_or(Decoded::Other, Decoded::Extra)
            }
            Some(MiscClass::Sync) => sync::decode(word).map_or(Decoded::Other, Decoded::Sync),
            None => Decoded::Other,
        },
        // data processing with immediate (incl. MOVW/MOVT)
        0b001 => Decoded::Other,
        // branches share the 10x gate with the block transfers; the
        // generic B9 patterns claim the branch words whose offset bits
        // land on them
        0b100 | 0b101 => block::decode(word).map_or(Decoded::Other, Decoded::Block),
        0b110 | 0b111 => coproc::decode(word).map_or(Decoded::Other, Decoded::Coproc),
        _ => Decoded::Other,
    }
}

/// Assembles a little-endian instruction word and classifies it.
///
/// # Errors
///
/// Returns [`SimError::SizeMismatch`] unless `bytes` is exactly 4 bytes
/// long. Thumb (2-byte or mixed-width) and AArch64 inputs are refused so
/// they can never be miscounted as A32 traffic.
pub fn decode(bytes: &[u8]) -> Result<Decoded, SimError> {
    let word: [u8; INSN_BYTES] = bytes
        .try_into()
        .map_err(|_| SimError::SizeMismatch(bytes.len()))?;
    Ok(classify(u32::from_le_bytes(word)))
}
