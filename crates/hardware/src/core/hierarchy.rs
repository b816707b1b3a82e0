//! The two-level cache hierarchy.
//!
//! [`CacheSystem`] owns the three modeled caches (split L1 instruction and
//! data caches in front of a unified L2) and implements the miss
//! forwarding between them: an L1 load miss issues an L2 load, an L1 store
//! miss issues an L2 store. L2 misses terminate the hierarchy; there is no
//! RAM model behind it.
//!
//! The hierarchy also hosts the cache-maintenance entry points the access
//! driver invokes for recognized control instructions.

use log::debug;

use crate::common::{ArchWord, SimError};
use crate::config::{CacheHierarchyConfig, CacheTarget};
use crate::core::cache::{Cache, CacheOutcome};
use crate::core::injector::InjectionPlan;

/// The I-cache / D-cache / L2 ensemble.
pub struct CacheSystem {
    icache: Cache,
    dcache: Cache,
    l2: Cache,
}

impl CacheSystem {
    /// Builds the hierarchy from per-level configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError::Geometry`] from whichever level is malformed;
    /// no cache is kept if any level fails.
    pub fn new(config: &CacheHierarchyConfig) -> Result<Self, SimError> {
        Ok(Self {
            icache: Cache::new(&config.l1_i)?,
            dcache: Cache::new(&config.l1_d)?,
            l2: Cache::new(&config.l2)?,
        })
    }

    /// Instruction fetch. An I-cache miss is forwarded to L2 as a load.
    /// Returns the first-level outcome.
    pub fn icache_load(&mut self, vaddr: u64) -> CacheOutcome {
        let outcome = self.icache.load(vaddr);
        if !outcome.is_hit() {
            self.l2.load(vaddr);
        }
        outcome
    }

    /// Data load. A D-cache miss is forwarded to L2 as a load.
    /// Returns the first-level outcome.
    pub fn dcache_load(&mut self, vaddr: u64) -> CacheOutcome {
        let outcome = self.dcache.load(vaddr);
        if !outcome.is_hit() {
            self.l2.load(vaddr);
        }
        outcome
    }

    /// Data store. A D-cache miss is forwarded to L2 as a store, where the
    /// L2's write-allocate policy decides whether the line is installed.
    /// Returns the first-level outcome.
    pub fn dcache_store(&mut self, vaddr: u64) -> CacheOutcome {
        let outcome = self.dcache.store(vaddr);
        if !outcome.is_hit() {
            self.l2.store(vaddr);
        }
        outcome
    }

    /// ICIALLU: invalidates every block of the instruction cache.
    pub fn icache_invalidate_all(&mut self) {
        debug!("icache invalidate all");
        self.icache.invalidate_all();
    }

    /// DCISW: invalidates one data-cache block by row ("set" in ARM terms)
    /// and way. Out-of-range coordinates are a silent no-op.
    pub fn dcache_invalidate_block(&mut self, row: u32, way: u32) {
        debug!("dcache invalidate row {row} way {way}");
        self.dcache.invalidate_block(row, way);
    }

    /// Borrows a cache by target.
    pub fn cache(&self, target: CacheTarget) -> &Cache {
        match target {
            CacheTarget::ICache => &self.icache,
            CacheTarget::DCache => &self.dcache,
            CacheTarget::L2Cache => &self.l2,
        }
    }

    /// Mutably borrows a cache by target.
    pub fn cache_mut(&mut self, target: CacheTarget) -> &mut Cache {
        match target {
            CacheTarget::ICache => &mut self.icache,
            CacheTarget::DCache => &mut self.dcache,
            CacheTarget::L2Cache => &mut self.l2,
        }
    }

    /// Effective address of the line resident at `(row, way)` in the chosen
    /// cache; 0 when the slot is empty.
    pub fn block_addr(&self, target: CacheTarget, row: u32, way: u32) -> ArchWord {
        self.cache(target).block_addr(row, way)
    }

    /// True when the chosen slot holds a valid line.
    pub fn is_block_valid(&self, target: CacheTarget, row: u32, way: u32) -> bool {
        self.cache(target).is_block_valid(row, way)
    }

    /// Range-checks an injection plan against its target cache.
    pub fn validate_injection(&self, plan: &InjectionPlan) -> Result<(), SimError> {
        self.cache(plan.cache)
            .validate_injection(plan.row, plan.way, plan.word)
    }

    /// Appends the three per-cache report blocks, I-cache first.
    pub fn write_report(&self, out: &mut String) {
        self.icache.stats().write_report("icache", out);
        self.dcache.stats().write_report("dcache", out);
        self.l2.stats().write_report("l2cache", out);
    }
}
