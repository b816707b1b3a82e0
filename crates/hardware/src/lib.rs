//! ARM Cortex-A9 cache-hierarchy simulator and fault injector.
//!
//! This crate models the memory subsystem of a Cortex-A9 / Zynq-7000
//! (split L1 instruction and data caches over a unified L2) driven by a
//! stream of executed guest instructions, and can corrupt one modeled
//! cache line at a scheduled instruction count for fault-tolerance
//! studies. It provides:
//! 1. **Cache model:** a reusable set-associative engine composed into the
//!    two-level hierarchy with miss forwarding.
//! 2. **Classifier:** an ARM v7-A load/store decoder that categorizes each
//!    32-bit instruction and extracts the fields cache emulation needs.
//! 3. **Driver:** per-instruction/per-access dispatch with global counters
//!    and cache-control (ICIALLU/DCISW) emulation.
//! 4. **Injector:** a single-shot fault injector that resolves planned
//!    cache coordinates into the byte address resident there.
//! 5. **Replay:** a trace format and simulator standing in for the
//!    binary-translation host, plus the supervisor stream protocol.

/// Common types (guest word, errors).
pub mod common;

/// Simulator configuration (defaults, enums, hierarchical structures).
pub mod config;

/// Cache engine, hierarchy, and fault injector.
pub mod core;

/// ARM v7-A load/store classification.
pub mod isa;

/// Access driver, trace replay, and supervisor link.
pub mod sim;

/// Counters and the teardown report.
pub mod stats;

/// Root configuration type; use `Config::default()` for the Zynq-7000
/// hierarchy or deserialize overrides from JSON.
pub use crate::config::Config;
/// Crate-wide error type.
pub use crate::common::SimError;
/// The three-cache hierarchy.
pub use crate::core::CacheSystem;
/// Single-shot fault injector and its plan/event types.
pub use crate::core::{FaultInjector, InjectionEvent, InjectionPlan};
/// Trace replay host; construct with `Simulator::new`.
pub use crate::sim::Simulator;
