//! Host-facing simulation layer.
//!
//! Binds guest-visible events to the cache model: the access driver, the
//! trace replayer that stands in for a live binary-translation host, and
//! the stream link to the fault-injection supervisor.

/// Per-instruction and per-access dispatch into the cache hierarchy.
pub mod driver;

/// Trace replay orchestration and the trace register file.
pub mod simulator;

/// Framed-token stream to the fault-injection supervisor.
pub mod supervisor;

/// Replay trace format and parsing.
pub mod trace;

pub use self::driver::{AccessDriver, GuestRegisters, TranslatedInsn};
pub use self::simulator::{Simulator, TraceRegisters};
pub use self::supervisor::SupervisorLink;
pub use self::trace::TraceEvent;
