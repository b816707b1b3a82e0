//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters the simulator reports at teardown:
//! 1. **Per-cache counters:** load/store hits and misses, compulsory misses,
//!    and evictions, with derived miss rates.
//! 2. **Global counters:** executed instructions, data loads, data stores,
//!    and cache-control (coprocessor) instructions.
//!
//! The report order is fixed: for each cache, load hits, load misses, load
//! miss rate, store hits, store misses, store miss rate, compulsory misses,
//! evictions; then the global counters.

use std::fmt::Write;

/// Hit/miss counters owned by a single cache.
///
/// The engine increments these directly; they are never reset for the
/// lifetime of the cache, so invalidation operations leave them unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of load lookups that found a valid matching line.
    pub load_hits: u64,
    /// Number of load lookups that missed.
    pub load_misses: u64,
    /// Number of store lookups that found a valid matching line.
    pub store_hits: u64,
    /// Number of store lookups that missed.
    pub store_misses: u64,
    /// Fills that landed in a slot whose previous entry was invalid.
    pub compulsory_misses: u64,
    /// Fills that displaced a previously valid line.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of load lookups that missed, as a percentage. Zero when no
    /// loads have been issued.
    pub fn load_miss_rate(&self) -> f64 {
        rate(self.load_misses, self.load_hits + self.load_misses)
    }

    /// Fraction of store lookups that missed, as a percentage. Zero when no
    /// stores have been issued.
    pub fn store_miss_rate(&self) -> f64 {
        rate(self.store_misses, self.store_hits + self.store_misses)
    }

    /// Appends this cache's report block to `out`, labeled with `name`.
    ///
    /// One line per counter, in the fixed report order.
    pub fn write_report(&self, name: &str, out: &mut String) {
        let mut line = |label: &str, value: String| {
            // width matches the %10ld columns of the reference output
            let _ = writeln!(out, "{name} {label:<16} {value:>10}");
        };
        line("load hits:", self.load_hits.to_string());
        line("load misses:", self.load_misses.to_string());
        line("load miss rate:", format!("{:.2}%", self.load_miss_rate()));
        line("store hits:", self.store_hits.to_string());
        line("store misses:", self.store_misses.to_string());
        line("store miss rate:", format!("{:.2}%", self.store_miss_rate()));
        line("compulsory:", self.compulsory_misses.to_string());
        line("evictions:", self.evictions.to_string());
    }
}

/// Global counters maintained by the access driver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Instructions executed inside the configured `.text` range.
    pub insn_count: u64,
    /// Data load accesses issued to the D-cache.
    pub load_count: u64,
    /// Data store accesses issued to the D-cache.
    pub store_count: u64,
    /// Cache-control (coprocessor) instructions executed.
    pub cp_count: u64,
}

impl SimStats {
    /// Appends the global counter block to `out`.
    pub fn write_report(&self, out: &mut String) {
        let mut line = |label: &str, value: u64| {
            let _ = writeln!(out, "{label:<22} {value:>10}");
        };
        line("insn count:", self.insn_count);
        line("load count:", self.load_count);
        line("store count:", self.store_count);
        line("cp count:", self.cp_count);
    }
}

/// `part / whole` as a percentage, tolerating an empty denominator.
fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}
