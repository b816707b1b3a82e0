//! Cache model and fault-injection state.
//!
//! This module contains the memory-side half of the simulator: the generic
//! set-associative engine, the three-cache hierarchy built from it, and the
//! single-shot fault injector that resolves planned coordinates into cached
//! addresses.

/// Generic set-associative cache engine and replacement policies.
pub mod cache;

/// I-cache / D-cache / unified L2 composition with miss forwarding.
pub mod hierarchy;

/// Single-shot cache fault injector.
pub mod injector;

pub use self::cache::{Cache, CacheOutcome};
pub use self::hierarchy::CacheSystem;
pub use self::injector::{FaultInjector, InjectionEvent, InjectionPlan};
