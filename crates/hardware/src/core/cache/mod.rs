//! Set-associative cache engine.
//!
//! This module implements the generic cache model that backs all three
//! levels of the hierarchy. It provides:
//! 1. **Geometry:** tag/row/offset decomposition derived once at
//!    construction from the power-of-two size, associativity, and line length.
//! 2. **Accesses:** load and store lookups with miss fills, invalid-slot
//!    preference, and configurable victim selection.
//! 3. **Maintenance:** per-block and whole-cache invalidation.
//! 4. **Introspection:** resident-address reconstruction and injection-plan
//!    validation for the fault injector.
//!
//! Tag comparison is performed on tag bits only, never on reconstructed
//! addresses: two addresses that differ only in their offset bits map to the
//! same `(row, tag)` pair and therefore the same line.

/// Cache replacement policy implementations.
pub mod policies;

use self::policies::{RandomPolicy, ReplacementPolicy, RoundRobinPolicy};
use crate::common::addr::{truncate, ArchWord, WORD_BYTES};
use crate::common::SimError;
use crate::config::{AllocPolicy, CacheConfig, ReplacePolicy};
use crate::stats::CacheStats;

/// Result of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The request missed; on loads (and write-allocating stores) the line
    /// is now resident.
    Miss,
    /// The request found a valid matching line.
    Hit,
}

impl CacheOutcome {
    /// True for [`CacheOutcome::Hit`].
    pub fn is_hit(self) -> bool {
        matches!(self, CacheOutcome::Hit)
    }
}

/// One cache line: the stored tag and its validity.
#[derive(Clone, Copy, Default)]
struct CacheEntry {
    tag: ArchWord,
    valid: bool,
}

/// Address decomposition masks, fixed per cache at construction.
#[derive(Clone, Copy, Debug)]
struct MaskInfo {
    /// Bits below the row index (offset within the line).
    row_shift: u32,
    /// Bits below the tag (offset plus row index).
    tag_shift: u32,
    /// Mask applied after shifting out the offset bits.
    row_mask: ArchWord,
}

/// A set-associative cache.
///
/// Entries live in one contiguous row-major allocation of
/// `rows * associativity` slots; row `r` occupies slots
/// `[r * ways, (r + 1) * ways)`.
pub struct Cache {
    size_bytes: u32,
    rows: u32,
    ways: u32,
    line_bytes: u32,
    masks: MaskInfo,
    entries: Vec<CacheEntry>,
    policy: Box<dyn ReplacementPolicy>,
    alloc: AllocPolicy,
    stats: CacheStats,
}

impl Cache {
    /// Builds a cache from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Geometry`] unless size, associativity, and line
    /// length are all non-zero powers of two, the line holds at least one
    /// guest word, and `line_bytes * ways` divides `size_bytes`.
    pub fn new(config: &CacheConfig) -> Result<Self, SimError> {
        let (size, ways, line) = (config.size_bytes, config.ways, config.line_bytes);
        let geometry_error = || SimError::Geometry { size, ways, line };

        if !size.is_power_of_two() || !ways.is_power_of_two() || !line.is_power_of_two() {
            return Err(geometry_error());
        }
        if line < WORD_BYTES {
            return Err(geometry_error());
        }
        let row_bytes = line
            .checked_mul(ways)
            .filter(|rb| *rb <= size && size % *rb == 0)
            .ok_or_else(geometry_error)?;
        let rows = size / row_bytes;

        let masks = MaskInfo {
            row_shift: line.trailing_zeros(),
            tag_shift: line.trailing_zeros() + rows.trailing_zeros(),
            row_mask: rows - 1,
        };

        let policy: Box<dyn ReplacementPolicy> = match config.replace {
            ReplacePolicy::RoundRobin => {
                Box::new(RoundRobinPolicy::new(rows as usize, ways as usize))
            }
            ReplacePolicy::Random => Box::new(RandomPolicy::new(ways as usize)),
        };

        Ok(Self {
            size_bytes: size,
            rows,
            ways,
            line_bytes: line,
            masks,
            entries: vec![CacheEntry::default(); (rows * ways) as usize],
            policy,
            alloc: config.alloc,
            stats: CacheStats::default(),
        })
    }

    /// Splits an address into its row index and tag.
    fn decompose(&self, vaddr: u64) -> (usize, ArchWord) {
        let addr = truncate(vaddr);
        let row = (addr >> self.masks.row_shift) & self.masks.row_mask;
        let tag = addr >> self.masks.tag_shift;
        (row as usize, tag)
    }

    /// Scans a row for a valid entry holding `tag`.
    fn lookup(&self, row: usize, tag: ArchWord) -> Option<usize> {
        let base = row * self.ways as usize;
        self.entries[base..base + self.ways as usize]
            .iter()
            .position(|e| e.valid && e.tag == tag)
    }

    /// Installs `tag` in `row`, preferring an invalid slot and falling back
    /// to the replacement policy. Accounts the fill as compulsory or as an
    /// eviction depending on what it displaced.
    fn fill(&mut self, row: usize, tag: ArchWord) {
        let base = row * self.ways as usize;
        let row_slots = &self.entries[base..base + self.ways as usize];
        let way = match row_slots.iter().position(|e| !e.valid) {
            Some(invalid) => invalid,
            None => self.policy.victim(row),
        };

        let entry = &mut self.entries[base + way];
        if entry.valid {
            self.stats.evictions += 1;
        } else {
            self.stats.compulsory_misses += 1;
        }
        *entry = CacheEntry { tag, valid: true };
    }

    /// Looks up `vaddr` for a read and fills the line on a miss.
    pub fn load(&mut self, vaddr: u64) -> CacheOutcome {
        let (row, tag) = self.decompose(vaddr);
        if self.lookup(row, tag).is_some() {
            self.stats.load_hits += 1;
            return CacheOutcome::Hit;
        }
        self.stats.load_misses += 1;
        self.fill(row, tag);
        CacheOutcome::Miss
    }

    /// Looks up `vaddr` for a write. A miss fills the line only under
    /// [`AllocPolicy::WriteAllocate`]; otherwise the cache is unchanged.
    pub fn store(&mut self, vaddr: u64) -> CacheOutcome {
        let (row, tag) = self.decompose(vaddr);
        if self.lookup(row, tag).is_some() {
            self.stats.store_hits += 1;
            return CacheOutcome::Hit;
        }
        self.stats.store_misses += 1;
        if self.alloc == AllocPolicy::WriteAllocate {
            self.fill(row, tag);
        }
        CacheOutcome::Miss
    }

    /// Clears the validity of one block. Out-of-range coordinates are a
    /// no-op, matching the tolerance the cache-control path relies on.
    pub fn invalidate_block(&mut self, row: u32, way: u32) {
        if row < self.rows && way < self.ways {
            self.entries[(row * self.ways + way) as usize].valid = false;
        }
    }

    /// Clears the validity of every block. Counters are preserved.
    pub fn invalidate_all(&mut self) {
        for entry in &mut self.entries {
            entry.valid = false;
        }
    }

    /// Reconstructs the effective address cached at `(row, way)`: the stored
    /// tag and the row index in their address positions, offset bits zero.
    ///
    /// Returns 0 when the coordinates are out of range or the block is not
    /// valid.
    pub fn block_addr(&self, row: u32, way: u32) -> ArchWord {
        if row >= self.rows || way >= self.ways {
            return 0;
        }
        let entry = &self.entries[(row * self.ways + way) as usize];
        if !entry.valid {
            return 0;
        }
        (entry.tag << self.masks.tag_shift) | (row << self.masks.row_shift)
    }

    /// True when `(row, way)` is in range and holds a valid line.
    pub fn is_block_valid(&self, row: u32, way: u32) -> bool {
        row < self.rows
            && way < self.ways
            && self.entries[(row * self.ways + way) as usize].valid
    }

    /// Checks that injection coordinates address an existing word slot.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InjectionRange`] when `row`, `way`, or the word
    /// index within the line is out of range for this cache.
    pub fn validate_injection(&self, row: u32, way: u32, word: u32) -> Result<(), SimError> {
        if row < self.rows && way < self.ways && word < self.line_bytes / WORD_BYTES {
            Ok(())
        } else {
            Err(SimError::InjectionRange { row, way, word })
        }
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Total capacity in bytes.
    pub fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Associativity.
    pub fn ways(&self) -> u32 {
        self.ways
    }

    /// Line length in bytes.
    pub fn line_bytes(&self) -> u32 {
        self.line_bytes
    }

    /// Shift that positions a row index within an address.
    pub fn row_shift(&self) -> u32 {
        self.masks.row_shift
    }

    /// Shift that positions a tag within an address.
    pub fn tag_shift(&self) -> u32 {
        self.masks.tag_shift
    }
}
