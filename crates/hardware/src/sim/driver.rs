//! The access driver: glue between guest-visible events and the cache model.
//!
//! The driver mirrors the two-phase shape of a binary-translation host.
//! At translation time [`AccessDriver::translate`] classifies one
//! instruction and records which runtime actions it needs: an
//! instruction-fetch action when the address lies in the configured
//! `.text` range, a data-access action for its memory traffic, and a
//! cache-control action when the word is a recognized maintenance
//! sequence. At execution time [`AccessDriver::exec_insn`] and
//! [`AccessDriver::data_access`] replay those actions against the cache
//! hierarchy, maintain the global counters, and feed the fault injector.
//!
//! Reading a guest register (needed for the DCISW set/way payload) is
//! abstracted behind [`GuestRegisters`] so the core never depends on a
//! particular host's CPU-state layout.

use log::{info, trace, warn};

use crate::common::{ArchWord, SimError};
use crate::config::Config;
use crate::core::hierarchy::CacheSystem;
use crate::core::injector::{FaultInjector, InjectionEvent, InjectionPlan};
use crate::isa::coproc::CacheMaintenance;
use crate::isa::{decode, disasm, Decoded, Direction};
use crate::stats::SimStats;

/// Reads guest general registers by index.
///
/// Implemented by the embedding host; the trace replayer keeps its own
/// register file fed from `R` records.
pub trait GuestRegisters {
    /// Returns the current value of general register `index` (0-15).
    fn read_register(&self, index: u8) -> ArchWord;
}

/// DCISW register payload layout for the modeled D-cache
/// (Cortex-A9: 4-way, 32-byte lines). Set occupies bits 13-4 and Way
/// bits 31-30, as in the reference model.
const DCISW_SET_SHIFT: u32 = 4;
/// Mask for the 10-bit Set field after shifting.
const DCISW_SET_MASK: ArchWord = 0x3FF;
/// Shift of the 2-bit Way field.
const DCISW_WAY_SHIFT: u32 = 30;

/// Splits a DCISW register payload into its `(set, way)` fields.
pub fn dcisw_fields(value: ArchWord) -> (u32, u32) {
    (
        (value >> DCISW_SET_SHIFT) & DCISW_SET_MASK,
        value >> DCISW_WAY_SHIFT,
    )
}

/// Cache-control action bound to an instruction at translation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheControl {
    /// DCISW: at execution, read register `rt`, split it into set/way, and
    /// invalidate that data-cache block.
    DcacheInvalidateSetWay {
        /// Guest register holding the set/way payload.
        rt: u8,
    },
    /// ICIALLU: invalidate the whole instruction cache.
    IcacheInvalidateAll,
}

/// One instruction's translation-time binding.
#[derive(Debug, Clone, Copy)]
pub struct TranslatedInsn {
    /// Virtual address of the instruction.
    pub vaddr: u64,
    /// True when the address lies inside the configured `.text` range, so
    /// executing it counts as an instruction fetch.
    pub in_text: bool,
    /// Data-traffic direction, when the instruction is a memory access.
    pub direction: Option<Direction>,
    /// Cache-control action, when the instruction is a recognized
    /// maintenance sequence and the target is ARM.
    pub control: Option<CacheControl>,
    /// The full classification, kept for inspection.
    pub decoded: Decoded,
}

/// Per-instruction/per-memory-event dispatcher (the C4 component).
pub struct AccessDriver {
    caches: CacheSystem,
    injector: FaultInjector,
    text_begin: u64,
    text_end: u64,
    arm_target: bool,
    counters: SimStats,
}

impl AccessDriver {
    /// Builds the driver, its cache hierarchy, and its injector from the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError::Geometry`] from cache construction.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let arm_target = config.general.is_arm();
        if !arm_target {
            info!(
                "target {:?} is not ARM: cache-control decoding disabled",
                config.general.target
            );
        }
        Ok(Self {
            caches: CacheSystem::new(&config.cache)?,
            injector: FaultInjector::new(config.injection.clone()),
            text_begin: config.general.text_begin,
            text_end: config.general.text_end,
            arm_target,
            counters: SimStats::default(),
        })
    }

    /// True when `addr` lies in the configured `.text` range.
    fn in_text(&self, addr: u64) -> bool {
        addr >= self.text_begin && addr < self.text_end
    }

    /// Classifies one instruction and binds its runtime actions.
    ///
    /// A word that is not 4 bytes is refused by the decoder; the driver
    /// then degrades to the generic instruction-execution action alone, so
    /// Thumb and AArch64 inputs are never miscounted as memory traffic.
    /// Non-ARM targets skip cache-control recognition the same way.
    pub fn translate(&self, vaddr: u64, bytes: &[u8]) -> TranslatedInsn {
        let decoded = match decode(bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("instruction at {vaddr:#010X}: {e}");
                Decoded::Other
            }
        };
        if let Ok(word) = <[u8; 4]>::try_from(bytes) {
            trace!(
                "{vaddr:#010X}: {}",
                disasm::disassemble(u32::from_le_bytes(word))
            );
        }

        let control = if self.arm_target {
            match decoded {
                Decoded::Coproc(cp) => cp.cache_maintenance().map(|m| match m {
                    CacheMaintenance::DcacheInvalidateSetWay => {
                        CacheControl::DcacheInvalidateSetWay { rt: cp.rt }
                    }
                    CacheMaintenance::IcacheInvalidateAll => CacheControl::IcacheInvalidateAll,
                }),
                _ => None,
            }
        } else {
            None
        };

        TranslatedInsn {
            vaddr,
            in_text: self.in_text(vaddr),
            direction: decoded.direction(),
            control,
            decoded,
        }
    }

    /// Classifies a raw word directly, without the byte-slice envelope.
    /// Useful to hosts that have already assembled the encoding.
    pub fn translate_word(&self, vaddr: u64, word: u32) -> TranslatedInsn {
        self.translate(vaddr, &word.to_le_bytes())
    }

    /// Executes one instruction's bound actions.
    ///
    /// Inside `.text` this counts the instruction, performs the I-cache
    /// fetch, and gives the injector its chance to fire. A bound
    /// cache-control action then reads the guest register through `regs`
    /// and applies the invalidation.
    ///
    /// Returns the injector's report when this instruction triggered it.
    pub fn exec_insn(
        &mut self,
        insn: &TranslatedInsn,
        regs: &dyn GuestRegisters,
    ) -> Option<Result<InjectionEvent, SimError>> {
        let mut fired = None;
        if insn.in_text {
            self.counters.insn_count += 1;
            self.caches.icache_load(insn.vaddr);
            fired = self.injector.observe(self.counters.insn_count, &self.caches);
        }

        if let Some(control) = insn.control {
            match control {
                CacheControl::DcacheInvalidateSetWay { rt } => {
                    let payload = regs.read_register(rt);
                    let (set, way) = dcisw_fields(payload);
                    self.caches.dcache_invalidate_block(set, way);
                }
                CacheControl::IcacheInvalidateAll => {
                    self.caches.icache_invalidate_all();
                }
            }
            self.counters.cp_count += 1;
        }

        fired
    }

    /// Dispatches one data access at its resolved effective address.
    ///
    /// Addresses inside `.text` are skipped: they were already accounted as
    /// instruction fetches. A [`Direction::LoadStore`] access (swap) issues
    /// the store and then the load, bumping both counters.
    pub fn data_access(&mut self, vaddr: u64, direction: Direction) {
        if self.in_text(vaddr) {
            return;
        }
        match direction {
            Direction::Load => {
                self.counters.load_count += 1;
                self.caches.dcache_load(vaddr);
            }
            Direction::Store => {
                self.counters.store_count += 1;
                self.caches.dcache_store(vaddr);
            }
            Direction::LoadStore => {
                self.counters.store_count += 1;
                self.caches.dcache_store(vaddr);
                self.counters.load_count += 1;
                self.caches.dcache_load(vaddr);
            }
        }
    }

    /// Arms the injector with a plan received at runtime.
    pub fn arm(&mut self, plan: InjectionPlan) {
        self.injector.arm(plan);
    }

    /// The cache hierarchy.
    pub fn caches(&self) -> &CacheSystem {
        &self.caches
    }

    /// Mutable access to the hierarchy, for hosts that seed cache state.
    pub fn caches_mut(&mut self) -> &mut CacheSystem {
        &mut self.caches
    }

    /// The injector.
    pub fn injector(&self) -> &FaultInjector {
        &self.injector
    }

    /// The global counters.
    pub fn counters(&self) -> &SimStats {
        &self.counters
    }

    /// Full teardown report: the three cache blocks followed by the global
    /// counters.
    pub fn report(&self) -> String {
        let mut out = String::new();
        self.caches.write_report(&mut out);
        self.counters.write_report(&mut out);
        out
    }
}
