//! Guest architecture word type.
//!
//! The modeled guest is ARM v7-A running in AArch32 state: addresses,
//! instruction encodings, and general registers are all 32 bits wide. Hosts
//! hand the core 64-bit virtual addresses; the cache model truncates them to
//! the guest word size before decomposition, exactly as the guest's own
//! address arithmetic would.

/// A guest word: AArch32 addresses, register values, and instruction encodings.
pub type ArchWord = u32;

/// Width of a guest word in bytes.
pub const WORD_BYTES: u32 = 4;

/// Truncates a host-supplied 64-bit virtual address to the guest word size.
#[inline(always)]
pub fn truncate(vaddr: u64) -> ArchWord {
    vaddr as ArchWord
}
