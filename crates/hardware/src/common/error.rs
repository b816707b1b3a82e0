//! Crate-wide error definitions.
//!
//! A single [`SimError`] enum covers every failure the core can report:
//! 1. **Configuration:** cache geometry rejected at construction.
//! 2. **Decoding:** instruction words that are not 4 bytes (Thumb, AArch64).
//! 3. **Injection:** out-of-range coordinates or a target slot with no valid line.
//! 4. **Replay / supervisor:** malformed trace lines, socket failures, bad tokens.
//!
//! Conditions that the original system tolerated in place (range errors,
//! invalid slots) are recoverable: the caller reports them to the external
//! collaborator and the simulation continues.

use thiserror::Error;

/// Errors surfaced by the simulator core.
#[derive(Debug, Error)]
pub enum SimError {
    /// Cache parameters rejected at construction. Size, associativity, and
    /// block size must all be non-zero powers of two, and
    /// `block_size * associativity` must divide the cache size.
    #[error("invalid cache geometry: size={size}B, ways={ways}, line={line}B")]
    Geometry { size: u32, ways: u32, line: u32 },

    /// The instruction word was not exactly 4 bytes. Thumb and AArch64
    /// encodings are refused rather than silently miscounted.
    #[error("expected a 4-byte ARM instruction word, got {0} bytes")]
    SizeMismatch(usize),

    /// Injection coordinates fall outside the chosen cache.
    #[error("injection target out of range: row {row}, way {way}, word {word}")]
    InjectionRange { row: u32, way: u32, word: u32 },

    /// The injection target slot holds no valid line (never filled, or
    /// invalidated before the trigger).
    #[error("injection target row {row} way {way} holds no valid line")]
    InvalidSlot { row: u32, way: u32 },

    /// The supervisor named a cache that does not exist.
    #[error("unknown cache name {0:?} (expected \"icache\", \"dcache\", or \"l2cache\")")]
    UnknownCache(String),

    /// A replay trace line could not be parsed.
    #[error("trace line {line}: {reason}")]
    Trace { line: usize, reason: String },

    /// The configuration JSON could not be deserialized.
    #[error("config parse: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The supervisor stream failed.
    #[error("supervisor link: {0}")]
    Link(#[from] std::io::Error),

    /// The supervisor sent a token that could not be parsed.
    #[error("supervisor sent malformed token {0:?}")]
    Token(String),
}
