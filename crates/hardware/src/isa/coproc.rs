//! Coprocessor load/store and register transfers (ARM ARM Table A5-22).
//!
//! Covers LDC/STC and the MCR/MRC register transfers for every coprocessor
//! except the floating-point/SIMD pair (`coproc & 0b1110 == 0b1010`), which
//! the model treats as opaque. MCR is the vehicle for the v7-A cache
//! maintenance system operations; the two sequences this model recognizes
//! are ICIALLU and DCISW.

use super::bits::InstructionBits;
use super::{Direction, Immediate};

/// The coprocessor memory and register-transfer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoprocOp {
    /// STC/STC2, A8-662.
    Stc,
    /// LDC/LDC2 (immediate), A8-392.
    LdcImm,
    /// LDC/LDC2 (literal), A8-394.
    LdcLit,
    /// MCR/MCR2, A8-476.
    Mcr,
    /// MRC/MRC2, A8-492.
    Mrc,
}

impl CoprocOp {
    /// Which way the operation moves data, if it touches memory at all.
    /// MCR/MRC move between registers and raise no memory traffic.
    pub fn direction(self) -> Option<Direction> {
        match self {
            CoprocOp::Stc => Some(Direction::Store),
            CoprocOp::LdcImm | CoprocOp::LdcLit => Some(Direction::Load),
            CoprocOp::Mcr | CoprocOp::Mrc => None,
        }
    }

    /// Assembler mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            CoprocOp::Stc => "stc",
            CoprocOp::LdcImm | CoprocOp::LdcLit => "ldc",
            CoprocOp::Mcr => "mcr",
            CoprocOp::Mrc => "mrc",
        }
    }
}

/// Cache maintenance operations recognized on the system coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMaintenance {
    /// ICIALLU: instruction cache invalidate all.
    IcacheInvalidateAll,
    /// DCISW: data cache invalidate by set/way.
    DcacheInvalidateSetWay,
}

/// A decoded coprocessor access or register transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoprocAccess {
    /// The identified operation.
    pub op: CoprocOp,
    /// Condition field.
    pub cond: u8,
    /// Coprocessor number (bits 11-8), unmasked.
    pub coproc: u8,
    /// `opc1` of an MCR/MRC.
    pub opc1: u8,
    /// `CRn` (the `Rn` field position).
    pub crn: u8,
    /// `CRm` (the `Rm` field position).
    pub crm: u8,
    /// `opc2` of an MCR/MRC.
    pub opc2: u8,
    /// General register `Rt` of an MCR/MRC; `CRd` of an LDC/STC.
    pub rt: u8,
    /// U bit of an LDC/STC.
    pub add: bool,
    /// P bit of an LDC/STC.
    pub index: bool,
    /// W bit of an LDC/STC.
    pub wback: bool,
    /// `Imm8` offset for LDC/STC; `None` for MCR/MRC.
    pub imm: Immediate,
}

impl CoprocAccess {
    /// Recognizes the modeled cache-control sequences.
    ///
    /// The comparison masks out the low coprocessor bit, so `p15` (and the
    /// debug coprocessor sharing its upper bits) match the `0xE` pattern of
    /// the reference tables. Only MCR with `opc1 = 0` qualifies:
    ///
    /// | operation | CRn | CRm | opc2 |
    /// |---|---|---|---|
    /// | ICIALLU | 7 | 5 | 0 |
    /// | DCISW   | 7 | 6 | 2 |
    pub fn cache_maintenance(&self) -> Option<CacheMaintenance> {
        if self.op != CoprocOp::Mcr || (self.coproc & 0xE) != 0xE || self.opc1 != 0 {
            return None;
        }
        match (self.crn, self.crm, self.opc2) {
            (7, 5, 0) => Some(CacheMaintenance::IcacheInvalidateAll),
            (7, 6, 2) => Some(CacheMaintenance::DcacheInvalidateSetWay),
            _ => None,
        }
    }
}

/// Decodes a word in the coprocessor space (`op1 = 0b11x`).
///
/// Returns `None` for the floating-point coprocessors, CDP, the
/// MCRR/MRRC corner (`op1 & 0b111011 == 0`), and the supervisor-call
/// region.
pub(crate) fn decode(word: u32) -> Option<CoprocAccess> {
    let coproc = word.coproc();
    if coproc & 0xE == 0xA {
        return None;
    }

    let op1 = word.coproc_op1();
    let op = if op1 & 0x30 == 0x20 {
        // 10xxxx: register transfers when bit 4 is set, CDP otherwise
        if word.class_op() == 1 {
            if op1 & 0x01 == 0 {
                CoprocOp::Mcr
            } else {
                CoprocOp::Mrc
            }
        } else {
            return None;
        }
    } else if op1 & 0x20 == 0 {
        // 0xxxxx: memory transfers; the 000x0x corner is MCRR/MRRC
        let masked = op1 & 0x3B;
        if masked == 0 {
            return None;
        }
        if op1 & 0x01 == 0 {
            CoprocOp::Stc
        } else if masked > 1 {
            if word.rn() == 0xF {
                CoprocOp::LdcLit
            } else {
                CoprocOp::LdcImm
            }
        } else {
            return None;
        }
    } else {
        // 11xxxx: supervisor call
        return None;
    };

    let memory_form = matches!(op, CoprocOp::Stc | CoprocOp::LdcImm | CoprocOp::LdcLit);
    Some(CoprocAccess {
        op,
        cond: word.cond(),
        coproc,
        opc1: word.opc1(),
        crn: word.rn(),
        crm: word.rm(),
        opc2: word.opc2(),
        rt: word.rt(),
        add: memory_form && word.bit(23),
        index: memory_form && word.bit(24),
        wback: memory_form && word.bit(21),
        imm: if memory_form {
            Immediate::Imm8(word.imm8())
        } else {
            Immediate::None
        },
    })
}
