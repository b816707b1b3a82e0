//! Block (multiple-register) load/store (ARM ARM Table A5-21).
//!
//! LDM/STM and their addressing-mode variants, discriminated by the opcode
//! field at bits 25-20 of the shared `op1 = 10x` class. `LDMIA sp!` and
//! `STMDB sp!` are recognized as POP and PUSH when the base register is
//! the stack pointer. The user-register and exception-return forms of the
//! B9 system space are matched by their `op & 0b000101` patterns, with
//! bit 15 of the register list separating exception return from
//! user-register load; those patterns also claim branch words (bit 25
//! set) whose offset bits land on them, while the remaining branch
//! encodings fall through as non-memory.

use super::bits::InstructionBits;
use super::Direction;

/// Register number of the stack pointer, which turns LDM/STM into POP/PUSH.
const SP: u8 = 0xD;

/// The block transfer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOp {
    /// STMDA (decrement after), A8-666.
    Stmda,
    /// STMDB (decrement before), A8-668.
    Stmdb,
    /// STMIA (increment after), A8-664.
    Stmia,
    /// STMIB (increment before), A8-670.
    Stmib,
    /// STM (user registers), B9-2008.
    StmUser,
    /// PUSH, A8-538.
    Push,
    /// LDMDA, A8-400.
    Ldmda,
    /// LDMDB, A8-402.
    Ldmdb,
    /// LDMIA, A8-398.
    Ldmia,
    /// LDMIB, A8-404.
    Ldmib,
    /// LDM (user registers), B9-1988.
    LdmUser,
    /// LDM (exception return), B9-1986.
    LdmExcRet,
    /// POP, A8-536.
    Pop,
}

impl BlockOp {
    /// Which way the operation moves data.
    pub fn direction(self) -> Direction {
        match self {
            BlockOp::Stmda
            | BlockOp::Stmdb
            | BlockOp::Stmia
            | BlockOp::Stmib
            | BlockOp::StmUser
            | BlockOp::Push => Direction::Store,
            _ => Direction::Load,
        }
    }

    /// Assembler mnemonic (IA variants use the bare `ldm`/`stm` spelling).
    pub fn mnemonic(self) -> &'static str {
        match self {
            BlockOp::Stmda => "stmda",
            BlockOp::Stmdb => "stmdb",
            BlockOp::Stmia | BlockOp::StmUser => "stm",
            BlockOp::Stmib => "stmib",
            BlockOp::Push => "push",
            BlockOp::Ldmda => "ldmda",
            BlockOp::Ldmdb => "ldmdb",
            BlockOp::Ldmia | BlockOp::LdmUser | BlockOp::LdmExcRet => "ldm",
            BlockOp::Ldmib => "ldmib",
            BlockOp::Pop => "pop",
        }
    }

    /// True for the B9 system forms rendered with a `^` suffix.
    pub fn is_user_form(self) -> bool {
        matches!(
            self,
            BlockOp::StmUser | BlockOp::LdmUser | BlockOp::LdmExcRet
        )
    }
}

/// A decoded block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTransfer {
    /// The identified operation.
    pub op: BlockOp,
    /// Condition field.
    pub cond: u8,
    /// Base register.
    pub rn: u8,
    /// W bit: the base register is written back.
    pub wback: bool,
    /// Transferred registers, bit `n` for register `n`.
    pub reg_list: u16,
}

/// Decodes a word in the branch-or-block class (`op1 & 0b110 == 0b100`).
///
/// Returns `None` for the branch encodings the generic B9 patterns do not
/// claim.
pub(crate) fn decode(word: u32) -> Option<BlockTransfer> {
    let op = word.block_op();
    let rn = word.rn();

    let op = match op {
        0x00 | 0x02 => BlockOp::Stmda,
        0x01 | 0x03 => BlockOp::Ldmda,
        0x08 | 0x0A => BlockOp::Stmia,
        0x09 => BlockOp::Ldmia,
        0x0B if rn == SP => BlockOp::Pop,
        0x0B => BlockOp::Ldmia,
        0x10 => BlockOp::Stmdb,
        0x12 if rn == SP => BlockOp::Push,
        0x12 => BlockOp::Stmdb,
        0x11 | 0x13 => BlockOp::Ldmdb,
        0x18 | 0x1A => BlockOp::Stmib,
        0x19 | 0x1B => BlockOp::Ldmib,
        // B9 system forms: STM/LDM (user registers), LDM (exception return)
        _ if op & 0x05 == 0x04 => BlockOp::StmUser,
        _ if op & 0x05 == 0x05 && word.bit(15) => BlockOp::LdmExcRet,
        _ if op & 0x05 == 0x05 => BlockOp::LdmUser,
        _ => return None,
    };

    Some(BlockTransfer {
        op,
        cond: word.cond(),
        rn,
        wback: word.bit(21),
        reg_list: word.reg_list(),
    })
}
