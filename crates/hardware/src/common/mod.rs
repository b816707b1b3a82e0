//! Common types used throughout the cache simulator.
//!
//! This module provides the fundamental building blocks shared across all
//! components. It includes:
//! 1. **Guest word type:** The AArch32 architecture word used for addresses and encodings.
//! 2. **Error handling:** The crate-wide error type covering configuration,
//!    decoding, injection, trace, and supervisor-link failures.

/// Guest architecture word type and width constants.
pub mod addr;

/// Crate-wide error definitions.
pub mod error;

pub use addr::{ArchWord, WORD_BYTES};
pub use error::SimError;
