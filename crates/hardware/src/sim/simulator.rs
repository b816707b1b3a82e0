//! Trace replay orchestration.
//!
//! [`Simulator`] owns the access driver, a guest register file fed from
//! trace records, and a translation cache keyed by instruction address,
//! the replay analogue of binding callbacks once per translated block and
//! executing them many times.

use std::collections::HashMap;

use crate::common::{ArchWord, SimError};
use crate::config::Config;
use crate::core::injector::{InjectionEvent, InjectionPlan};
use crate::isa::Direction;
use crate::sim::driver::{AccessDriver, GuestRegisters, TranslatedInsn};
use crate::sim::trace::TraceEvent;

/// Guest register file reconstructed from `R` trace records.
pub struct TraceRegisters {
    regs: [ArchWord; 16],
}

impl TraceRegisters {
    /// Creates a register file with every register zero.
    pub fn new() -> Self {
        Self { regs: [0; 16] }
    }

    /// Records a register value from the trace.
    pub fn write(&mut self, index: u8, value: ArchWord) {
        if let Some(slot) = self.regs.get_mut(index as usize) {
            *slot = value;
        }
    }
}

impl Default for TraceRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl GuestRegisters for TraceRegisters {
    fn read_register(&self, index: u8) -> ArchWord {
        self.regs.get(index as usize).copied().unwrap_or(0)
    }
}

/// Top-level replay host: driver, registers, and the translation cache.
pub struct Simulator {
    driver: AccessDriver,
    regs: TraceRegisters,
    translations: HashMap<u64, TranslatedInsn>,
    last_direction: Option<Direction>,
}

impl Simulator {
    /// Builds a simulator from the configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError::Geometry`] from cache construction.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        Ok(Self {
            driver: AccessDriver::new(config)?,
            regs: TraceRegisters::new(),
            translations: HashMap::new(),
            last_direction: None,
        })
    }

    /// Replays one event.
    ///
    /// Returns the injector's report when this event triggered it.
    pub fn step(&mut self, event: &TraceEvent) -> Option<Result<InjectionEvent, SimError>> {
        match *event {
            TraceEvent::Insn { vaddr, word } => {
                let driver = &self.driver;
                let insn = *self
                    .translations
                    .entry(vaddr)
                    .or_insert_with(|| driver.translate(vaddr, &word.to_le_bytes()));
                self.last_direction = insn.direction;
                self.driver.exec_insn(&insn, &self.regs)
            }
            TraceEvent::Mem { vaddr, store } => {
                // A swap issues both halves from one trace record.
                let direction = match self.last_direction {
                    Some(Direction::LoadStore) => Direction::LoadStore,
                    _ if store => Direction::Store,
                    _ => Direction::Load,
                };
                self.driver.data_access(vaddr, direction);
                None
            }
            TraceEvent::Reg { index, value } => {
                self.regs.write(index, value);
                None
            }
        }
    }

    /// Replays a whole trace, collecting every injector report in order.
    pub fn run(&mut self, events: &[TraceEvent]) -> Vec<Result<InjectionEvent, SimError>> {
        events.iter().filter_map(|event| self.step(event)).collect()
    }

    /// Arms the injector with a plan received at runtime.
    pub fn arm(&mut self, plan: InjectionPlan) {
        self.driver.arm(plan);
    }

    /// The access driver.
    pub fn driver(&self) -> &AccessDriver {
        &self.driver
    }

    /// Mutable access to the driver.
    pub fn driver_mut(&mut self) -> &mut AccessDriver {
        &mut self.driver
    }

    /// The teardown report.
    pub fn report(&self) -> String {
        self.driver.report()
    }
}
