//! Disassembler for the classified memory instructions.
//!
//! Converts a 32-bit A32 encoding into a human-readable mnemonic string
//! for debug tracing, logging, and test diagnostics. Only the instruction
//! classes the model cares about are rendered in full; everything else
//! falls back to a `.word` directive so a trace line always prints.
//!
//! # Usage
//!
//! ```
//! use a9sim_core::isa::disasm::disassemble;
//!
//! assert_eq!(disassemble(0xE5912034), "ldr r2, [r1, #52]");
//! assert_eq!(disassemble(0xE8BD000F), "pop {r0, r1, r2, r3}");
//! ```

use std::fmt::Write;

use super::block::BlockTransfer;
use super::coproc::{CoprocAccess, CoprocOp};
use super::decode::{classify, Decoded};
use super::extra::ExtraAccess;
use super::regular::RegularAccess;
use super::sync::SyncAccess;
use super::{Direction, Immediate};

/// ABI register names for r0–r15.
const REG_NAMES: [&str; 16] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "sp", "lr",
    "pc",
];

/// Shift mnemonics for the register-offset forms.
const SHIFT_NAMES: [&str; 4] = ["lsl", "lsr", "asr", "ror"];

/// Returns the ABI name for a general register index.
#[inline]
fn reg(idx: u8) -> &'static str {
    REG_NAMES.get(idx as usize).copied().unwrap_or("r??")
}

/// Disassembles a 32-bit A32 instruction into a human-readable string.
///
/// Returns a mnemonic like `"str r0, [sp, #-4]"`, or a `.word` directive
/// for encodings outside the modeled memory classes.
pub fn disassemble(word: u32) -> String {
    match classify(word) {
        Decoded::Regular(access) => regular(&access),
        Decoded::Extra(access) => extra(&access),
        Decoded::Block(transfer) => block(&transfer),
        Decoded::Coproc(access) => coproc(&access),
        Decoded::Sync(access) => sync_primitive(&access),
        Decoded::Other => format!(".word 0x{word:08X}"),
    }
}

/// Renders a signed immediate offset, honoring the U bit.
fn signed_imm(value: u32, add: bool) -> String {
    if add {
        format!("#{value}")
    } else {
        format!("#-{value}")
    }
}

/// Renders the `[rn, offset]` / `[rn], offset` addressing of the regular
/// and extra forms.
fn addressing(rn: u8, offset: &str, index: bool, wback: bool) -> String {
    if index {
        let suffix = if wback { "!" } else { "" };
        format!("[{}, {offset}]{suffix}", reg(rn))
    } else {
        format!("[{}], {offset}", reg(rn))
    }
}

/// Regular word/byte load/store.
fn regular(access: &RegularAccess) -> String {
    let mnemonic = access.op.mnemonic();
    let rt = reg(access.rt);
    match access.imm {
        Immediate::Imm32(imm) => format!("{mnemonic} {rt}, [pc, #{imm}]"),
        Immediate::Imm12(imm) => {
            let offset = signed_imm(imm as u32, access.add);
            format!(
                "{mnemonic} {rt}, {}",
                addressing(access.rn, &offset, access.index, access.wback && access.index)
            )
        }
        Immediate::Imm5(shift) => {
            let sign = if access.add { "" } else { "-" };
            let mut offset = format!("{sign}{}", reg(access.rm));
            if shift != 0 {
                let _ = write!(
                    offset,
                    ", {} #{shift}",
                    SHIFT_NAMES[access.shift_type as usize]
                );
            }
            format!(
                "{mnemonic} {rt}, {}",
                addressing(access.rn, &offset, access.index, access.wback && access.index)
            )
        }
        _ => format!("{mnemonic} {rt}, [{}]", reg(access.rn)),
    }
}

/// Extra halfword/dual/signed load/store.
fn extra(access: &ExtraAccess) -> String {
    let mnemonic = access.op.mnemonic();
    let rt = reg(access.rt);
    let offset = match access.imm {
        Immediate::Imm32(imm) => signed_imm(imm, access.add),
        _ => {
            let sign = if access.add { "" } else { "-" };
            format!("{sign}{}", reg(access.rm))
        }
    };
    format!(
        "{mnemonic} {rt}, {}",
        addressing(access.rn, &offset, access.index, access.wback && access.index)
    )
}

/// Renders a register bitmap as `{r0, r1, ...}`.
fn reg_list(mask: u16) -> String {
    let mut out = String::from("{");
    let mut first = true;
    for idx in 0..16u8 {
        if mask & (1 << idx) != 0 {
            if !first {
                out.push_str(", ");
            }
            out.push_str(reg(idx));
            first = false;
        }
    }
    out.push('}');
    out
}

/// Block transfer: PUSH/POP omit the implicit stack base.
fn block(transfer: &BlockTransfer) -> String {
    let mnemonic = transfer.op.mnemonic();
    let list = reg_list(transfer.reg_list);
    let user = if transfer.op.is_user_form() { "^" } else { "" };
    match mnemonic {
        "push" | "pop" => format!("{mnemonic} {list}"),
        _ => {
            let wback = if transfer.wback { "!" } else { "" };
            format!("{mnemonic} {}{wback}, {list}{user}", reg(transfer.rn))
        }
    }
}

/// Coprocessor access or register transfer.
fn coproc(access: &CoprocAccess) -> String {
    let mnemonic = access.op.mnemonic();
    match access.op {
        CoprocOp::Mcr | CoprocOp::Mrc => format!(
            "{mnemonic} p{}, {}, {}, c{}, c{}, {}",
            access.coproc,
            access.opc1,
            reg(access.rt),
            access.crn,
            access.crm,
            access.opc2
        ),
        _ => {
            let offset = match access.imm {
                // LDC/STC immediates are word-scaled
                Immediate::Imm8(imm) => signed_imm(imm as u32 * 4, access.add),
                _ => String::from("#0"),
            };
            format!(
                "{mnemonic} p{}, c{}, {}",
                access.coproc,
                access.rt,
                addressing(access.crn, &offset, access.index, access.wback)
            )
        }
    }
}

/// Synchronization primitive. The swap and store forms name their source
/// register; the exclusive loads do not have one.
fn sync_primitive(access: &SyncAccess) -> String {
    let mnemonic = access.op.mnemonic();
    match access.op.direction() {
        Direction::Load => format!("{mnemonic} {}, [{}]", reg(access.rt), reg(access.rn)),
        _ => format!(
            "{mnemonic} {}, {}, [{}]",
            reg(access.rt),
            reg(access.rm),
            reg(access.rn)
        ),
    }
}
