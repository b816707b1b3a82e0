//! Single-shot cache fault injector.
//!
//! The injector watches the global instruction counter and, at the first
//! instruction boundary where it reaches the planned sleep count, resolves
//! the planned `(cache, row, way, word)` coordinates into the byte address
//! currently cached there. The result is handed back to the caller for
//! delivery to the external collaborator; the injector itself never touches
//! a socket.
//!
//! One plan is consumed per run. After firing the injector is inert.

use log::{info, warn};
use serde::Deserialize;

use crate::common::addr::{ArchWord, WORD_BYTES};
use crate::common::SimError;
use crate::config::CacheTarget;
use crate::core::hierarchy::CacheSystem;

/// Where and when to corrupt a cache line.
#[derive(Debug, Clone, Deserialize)]
pub struct InjectionPlan {
    /// Instruction count to wait for before firing.
    pub sleep_cycles: u64,
    /// Which cache to target.
    pub cache: CacheTarget,
    /// Row ("set" in ARM terms) of the target line.
    pub row: u32,
    /// Way of the target line.
    pub way: u32,
    /// Word index within the line; the corrupted byte address is
    /// `block_addr + word * 4`.
    pub word: u32,
}

/// What the injector reports when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionEvent {
    /// Instruction count at the moment of firing (may exceed the planned
    /// sleep count when the trigger lands mid-block).
    pub insn_count: u64,
    /// Byte address of the corrupted word.
    pub addr: ArchWord,
}

/// Injector lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InjectorState {
    /// Waiting for the instruction counter to reach the plan.
    Armed,
    /// The single shot has been spent (or no plan was ever supplied).
    Fired,
}

/// Single-shot fault injector.
pub struct FaultInjector {
    plan: Option<InjectionPlan>,
    state: InjectorState,
}

impl FaultInjector {
    /// Creates an injector. `None` builds an inert injector that never
    /// fires, for profiling-only runs.
    pub fn new(plan: Option<InjectionPlan>) -> Self {
        let state = if plan.is_some() {
            InjectorState::Armed
        } else {
            InjectorState::Fired
        };
        Self { plan, state }
    }

    /// Arms the injector with a plan received at runtime (from the
    /// supervisor). Replaces any earlier, unfired plan.
    pub fn arm(&mut self, plan: InjectionPlan) {
        info!(
            "arming injector: sleep {} cycles, {} row {} way {} word {}",
            plan.sleep_cycles, plan.cache, plan.row, plan.way, plan.word
        );
        self.plan = Some(plan);
        self.state = InjectorState::Armed;
    }

    /// True while a plan is loaded and unfired.
    pub fn is_armed(&self) -> bool {
        self.state == InjectorState::Armed && self.plan.is_some()
    }

    /// Called once per retired instruction with the running count.
    ///
    /// Returns `None` until the trigger, then exactly one report:
    ///
    /// - `Some(Ok(event))`: the corrupted address was resolved; the
    ///   injector is now inert.
    /// - `Some(Err(SimError::InvalidSlot))`: the target slot holds no
    ///   valid line; the shot is consumed and the collaborator decides how
    ///   to proceed.
    /// - `Some(Err(SimError::InjectionRange))`: the plan does not fit the
    ///   cache; the plan is discarded but the injector stays armed for a
    ///   replacement plan.
    pub fn observe(
        &mut self,
        insn_count: u64,
        caches: &CacheSystem,
    ) -> Option<Result<InjectionEvent, SimError>> {
        if self.state != InjectorState::Armed {
            return None;
        }
        let plan = self.plan.as_ref()?;
        if insn_count < plan.sleep_cycles {
            return None;
        }

        if let Err(e) = caches.validate_injection(plan) {
            warn!("discarding injection plan: {e}");
            self.plan = None;
            return Some(Err(e));
        }

        let plan = self.plan.take()?;
        self.state = InjectorState::Fired;

        if !caches.is_block_valid(plan.cache, plan.row, plan.way) {
            warn!(
                "injection target {} row {} way {} is not a valid line",
                plan.cache, plan.row, plan.way
            );
            return Some(Err(SimError::InvalidSlot {
                row: plan.row,
                way: plan.way,
            }));
        }

        let addr = caches.block_addr(plan.cache, plan.row, plan.way) + plan.word * WORD_BYTES;
        info!("injecting fault at {:#010X} after {} instructions", addr, insn_count);
        Some(Ok(InjectionEvent { insn_count, addr }))
    }
}
