//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** The ARM Cortex-A9 / Zynq-7000 cache hierarchy constants.
//! 2. **Structures:** Hierarchical config for the general settings and the
//!    three cache levels.
//! 3. **Enums:** Replacement policy, allocation policy, and cache selection.
//!
//! Configuration is supplied as JSON (every field has a default) or via
//! `Config::default()`, which reproduces the Zynq-7000 hierarchy exactly.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::common::SimError;
use crate::core::injector::InjectionPlan;

/// Default configuration constants for the simulator.
///
/// These values describe the cache hierarchy of the ARM Cortex-A9 as found
/// in the Xilinx Zynq-7000, and are used when a field is not overridden.
mod defaults {
    /// L1 instruction cache capacity (32 KiB).
    pub const L1I_SIZE_BYTES: u32 = 32 * 1024;

    /// L1 data cache capacity (32 KiB).
    pub const L1D_SIZE_BYTES: u32 = 32 * 1024;

    /// Unified L2 cache capacity (512 KiB).
    pub const L2_SIZE_BYTES: u32 = 512 * 1024;

    /// L1 associativity (both instruction and data sides).
    pub const L1_WAYS: u32 = 4;

    /// L2 associativity.
    pub const L2_WAYS: u32 = 8;

    /// Cache line length, identical at every level (32 bytes).
    pub const LINE_BYTES: u32 = 32;

    /// Guest target identification string that enables cache-control decoding.
    pub const TARGET: &str = "arm";
}

/// Victim-selection algorithm used when a row has no invalid slot left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacePolicy {
    /// Per-row cursor that walks the ways in order.
    #[serde(alias = "RoundRobin")]
    RoundRobin,
    /// Single multiplicative-congruential sequence shared by every row.
    #[serde(alias = "Random")]
    Random,
}

/// Whether a store miss installs the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocPolicy {
    /// A store miss fills the line exactly as a load miss would.
    #[serde(alias = "WriteAllocate")]
    WriteAllocate,
    /// A store miss leaves the cache untouched.
    #[serde(alias = "NoWriteAllocate")]
    NoWriteAllocate,
}

/// Selects one of the three modeled caches.
///
/// The string forms accepted from the supervisor and in JSON are the
/// original names `"icache"`, `"dcache"`, and `"l2cache"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CacheTarget {
    /// L1 instruction cache.
    #[serde(rename = "icache")]
    ICache,
    /// L1 data cache.
    #[serde(rename = "dcache")]
    DCache,
    /// Unified L2 cache.
    #[serde(rename = "l2cache")]
    L2Cache,
}

impl FromStr for CacheTarget {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, SimError> {
        match s {
            "icache" => Ok(CacheTarget::ICache),
            "dcache" => Ok(CacheTarget::DCache),
            "l2cache" => Ok(CacheTarget::L2Cache),
            other => Err(SimError::UnknownCache(other.to_string())),
        }
    }
}

impl fmt::Display for CacheTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheTarget::ICache => "icache",
            CacheTarget::DCache => "dcache",
            CacheTarget::L2Cache => "l2cache",
        })
    }
}

/// Geometry and policy of a single cache level.
///
/// `rows` is derived, not configured: `size_bytes / (ways * line_bytes)`.
/// The constructor of the engine validates that all three sizes are non-zero
/// powers of two and that the division is exact.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Total capacity in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: u32,

    /// Line (block) length in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: u32,

    /// Associativity (number of ways per row).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: u32,

    /// Victim-selection policy.
    #[serde(default = "CacheConfig::default_replace")]
    pub replace: ReplacePolicy,

    /// Store-miss allocation policy.
    #[serde(default = "CacheConfig::default_alloc")]
    pub alloc: AllocPolicy,
}

impl CacheConfig {
    /// Returns the default cache capacity (L1 value).
    fn default_size() -> u32 {
        defaults::L1I_SIZE_BYTES
    }

    /// Returns the default line length.
    fn default_line() -> u32 {
        defaults::LINE_BYTES
    }

    /// Returns the default associativity (L1 value).
    fn default_ways() -> u32 {
        defaults::L1_WAYS
    }

    /// Returns the default replacement policy (L1 value).
    fn default_replace() -> ReplacePolicy {
        ReplacePolicy::Random
    }

    /// Returns the default allocation policy (L1 value).
    fn default_alloc() -> AllocPolicy {
        AllocPolicy::NoWriteAllocate
    }

    /// Number of rows implied by the geometry. Meaningful only once the
    /// geometry has been validated by the engine constructor.
    pub fn rows(&self) -> u32 {
        self.size_bytes / (self.ways * self.line_bytes)
    }
}

/// Configuration of the full two-level hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache.
    #[serde(default = "CacheHierarchyConfig::default_l1_i")]
    pub l1_i: CacheConfig,

    /// L1 data cache.
    #[serde(default = "CacheHierarchyConfig::default_l1_d")]
    pub l1_d: CacheConfig,

    /// Unified L2 cache.
    #[serde(default = "CacheHierarchyConfig::default_l2")]
    pub l2: CacheConfig,
}

impl CacheHierarchyConfig {
    /// Zynq-7000 L1 instruction cache: 32 KiB, 4-way, 32 B lines, random
    /// replacement, no write-allocate.
    fn default_l1_i() -> CacheConfig {
        CacheConfig {
            size_bytes: defaults::L1I_SIZE_BYTES,
            line_bytes: defaults::LINE_BYTES,
            ways: defaults::L1_WAYS,
            replace: ReplacePolicy::Random,
            alloc: AllocPolicy::NoWriteAllocate,
        }
    }

    /// Zynq-7000 L1 data cache: 32 KiB, 4-way, 32 B lines, random
    /// replacement, no write-allocate.
    fn default_l1_d() -> CacheConfig {
        CacheConfig {
            size_bytes: defaults::L1D_SIZE_BYTES,
            line_bytes: defaults::LINE_BYTES,
            ways: defaults::L1_WAYS,
            replace: ReplacePolicy::Random,
            alloc: AllocPolicy::NoWriteAllocate,
        }
    }

    /// Zynq-7000 unified L2: 512 KiB, 8-way, 32 B lines, round-robin
    /// replacement, write-allocate.
    fn default_l2() -> CacheConfig {
        CacheConfig {
            size_bytes: defaults::L2_SIZE_BYTES,
            line_bytes: defaults::LINE_BYTES,
            ways: defaults::L2_WAYS,
            replace: ReplacePolicy::RoundRobin,
            alloc: AllocPolicy::WriteAllocate,
        }
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1_i: Self::default_l1_i(),
            l1_d: Self::default_l1_d(),
            l2: Self::default_l2(),
        }
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// First address of the guest `.text` section (inclusive). Instruction
    /// fetches are accounted only inside `[text_begin, text_end)`, and data
    /// accesses inside the range are skipped as already counted.
    #[serde(default)]
    pub text_begin: u64,

    /// One past the last address of the guest `.text` section (exclusive).
    #[serde(default)]
    pub text_end: u64,

    /// Guest target identification string. Cache-control instruction
    /// decoding is enabled only for `"arm"`; any other target degrades
    /// gracefully to plain access counting.
    #[serde(default = "GeneralConfig::default_target")]
    pub target: String,
}

impl GeneralConfig {
    /// Returns the default target identification string.
    fn default_target() -> String {
        defaults::TARGET.to_string()
    }

    /// True when the configured target enables ARM-specific decoding.
    pub fn is_arm(&self) -> bool {
        self.target == defaults::TARGET
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            text_begin: 0,
            text_end: 0,
            target: defaults::TARGET.to_string(),
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use a9sim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.cache.l1_d.size_bytes, 32 * 1024);
/// assert_eq!(config.cache.l2.ways, 8);
/// ```
///
/// Deserializing overrides from JSON:
///
/// ```
/// use a9sim_core::config::{Config, ReplacePolicy};
///
/// let json = r#"{
///     "general": { "text_begin": 65536, "text_end": 131072 },
///     "cache": {
///         "l1_d": {
///             "size_bytes": 16384,
///             "line_bytes": 32,
///             "ways": 2,
///             "replace": "ROUND_ROBIN",
///             "alloc": "NO_WRITE_ALLOCATE"
///         }
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.l1_d.ways, 2);
/// assert_eq!(config.cache.l1_d.replace, ReplacePolicy::RoundRobin);
/// assert_eq!(config.cache.l2.size_bytes, 512 * 1024);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General settings (`.text` range, guest target).
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cache hierarchy geometry and policies.
    #[serde(default)]
    pub cache: CacheHierarchyConfig,

    /// Optional fault-injection plan. When absent the injector stays inert
    /// unless a plan arrives from the supervisor at runtime.
    #[serde(default)]
    pub injection: Option<InjectionPlan>,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(text)?)
    }
}
