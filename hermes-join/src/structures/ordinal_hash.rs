//! Sparse set of 64-bit keys
//!
//! Backed by a hashbrown open-addressed table with the Fx hasher. Starts at
//! the smallest capacity and grows with the number of distinct keys, so the
//! footprint tracks the matches rather than the key domain.

use std::mem::size_of;

use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;

/// Initial number of slots requested from the table.
const INITIAL_CAPACITY: usize = 1;

/// Open-addressed hash set over `u64` keys.
#[derive(Debug, Clone)]
pub struct OrdinalHash {
    keys: HashSet<u64, FxBuildHasher>,
}

impl Default for OrdinalHash {
    fn default() -> Self {
        Self::new()
    }
}

impl OrdinalHash {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: HashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Insert `key`. Returns true if it was not already present.
    #[inline]
    pub fn add(&mut self, key: u64) -> bool {
        self.keys.insert(key)
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.keys.contains(&key)
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Estimated heap bytes held by the table.
    ///
    /// hashbrown stores one control byte per bucket next to the key slot.
    pub fn ram_bytes_used(&self) -> usize {
        self.keys.capacity() * (size_of::<u64>() + 1)
    }
}
