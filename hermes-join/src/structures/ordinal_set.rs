//! Adaptive set of global ordinals
//!
//! Two interchangeable representations selected once at construction:
//!
//! | Variant | Backing      | Memory                    | Used when                     |
//! |---------|--------------|---------------------------|-------------------------------|
//! | Dense   | [`BitArray`] | O(max_ord) bits           | single top-level aggregator   |
//! | Sparse  | [`OrdinalHash`] | O(distinct ordinals)   | one instance per parent bucket |
//!
//! Both answer `contains` identically for the same `add` history.

use super::{BitArray, OrdinalHash};

/// Which representation backs an [`OrdinalSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalSetKind {
    Dense,
    Sparse,
}

/// Set of global ordinals in `[0, max_ord)`.
///
/// Storage is freed by [`release`](Self::release) or on drop, whichever comes
/// first. Any use after release is a programming error and panics.
#[derive(Debug)]
pub enum OrdinalSet {
    Dense(BitArray),
    Sparse { ords: OrdinalHash, max_ord: u64 },
    Released,
}

impl OrdinalSet {
    /// Bit-per-ordinal set sized for `max_ord`.
    ///
    /// `max_ord` must already be validated against the platform bound.
    pub fn dense(max_ord: u64) -> Self {
        OrdinalSet::Dense(BitArray::new(max_ord as usize))
    }

    /// Hashed set starting at minimal capacity.
    pub fn sparse(max_ord: u64) -> Self {
        OrdinalSet::Sparse {
            ords: OrdinalHash::new(),
            max_ord,
        }
    }

    pub fn new(kind: OrdinalSetKind, max_ord: u64) -> Self {
        match kind {
            OrdinalSetKind::Dense => Self::dense(max_ord),
            OrdinalSetKind::Sparse => Self::sparse(max_ord),
        }
    }

    /// Representation in use, `None` once released.
    pub fn kind(&self) -> Option<OrdinalSetKind> {
        match self {
            OrdinalSet::Dense(_) => Some(OrdinalSetKind::Dense),
            OrdinalSet::Sparse { .. } => Some(OrdinalSetKind::Sparse),
            OrdinalSet::Released => None,
        }
    }

    /// Exclusive upper bound on accepted ordinals.
    pub fn max_ord(&self) -> u64 {
        match self {
            OrdinalSet::Dense(bits) => bits.len() as u64,
            OrdinalSet::Sparse { max_ord, .. } => *max_ord,
            OrdinalSet::Released => 0,
        }
    }

    /// Record `ordinal`. Adding an ordinal twice is a no-op.
    #[inline]
    pub fn add(&mut self, ordinal: u64) {
        let max_ord = self.max_ord();
        match self {
            OrdinalSet::Dense(bits) => {
                check_range(ordinal, max_ord);
                bits.set(ordinal as usize);
            }
            OrdinalSet::Sparse { ords, .. } => {
                check_range(ordinal, max_ord);
                ords.add(ordinal);
            }
            OrdinalSet::Released => panic!("ordinal set used after release"),
        }
    }

    #[inline]
    pub fn contains(&self, ordinal: u64) -> bool {
        match self {
            OrdinalSet::Dense(bits) => bits.get(ordinal as usize),
            OrdinalSet::Sparse { ords, .. } => ords.contains(ordinal),
            OrdinalSet::Released => panic!("ordinal set used after release"),
        }
    }

    /// Number of distinct ordinals added.
    pub fn len(&self) -> usize {
        match self {
            OrdinalSet::Dense(bits) => bits.cardinality(),
            OrdinalSet::Sparse { ords, .. } => ords.len(),
            OrdinalSet::Released => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_released(&self) -> bool {
        matches!(self, OrdinalSet::Released)
    }

    pub fn ram_bytes_used(&self) -> usize {
        match self {
            OrdinalSet::Dense(bits) => bits.ram_bytes_used(),
            OrdinalSet::Sparse { ords, .. } => ords.ram_bytes_used(),
            OrdinalSet::Released => 0,
        }
    }

    /// Free the backing storage. Safe to call more than once.
    ///
    /// Returns the number of bytes freed.
    pub fn release(&mut self) -> usize {
        let freed = self.ram_bytes_used();
        *self = OrdinalSet::Released;
        freed
    }
}

#[inline]
fn check_range(ordinal: u64, max_ord: u64) {
    assert!(
        ordinal < max_ord,
        "global ordinal {} out of range [0, {})",
        ordinal,
        max_ord
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(max_ord: u64) -> [OrdinalSet; 2] {
        [OrdinalSet::dense(max_ord), OrdinalSet::sparse(max_ord)]
    }

    #[test]
    fn test_add_then_contains() {
        for mut set in both(10) {
            for ord in 0..10 {
                assert!(!set.contains(ord));
                set.add(ord);
                assert!(set.contains(ord));
            }
            assert_eq!(set.len(), 10);
        }
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        for mut set in both(10) {
            set.add(4);
            set.add(4);
            assert!(set.contains(4));
            assert_eq!(set.len(), 1);
        }
    }

    #[test]
    fn test_kinds() {
        let [dense, sparse] = both(5);
        assert_eq!(dense.kind(), Some(OrdinalSetKind::Dense));
        assert_eq!(sparse.kind(), Some(OrdinalSetKind::Sparse));
        assert_eq!(dense.max_ord(), 5);
        assert_eq!(sparse.max_ord(), 5);
    }

    #[test]
    fn test_dense_footprint_is_fixed() {
        let mut set = OrdinalSet::dense(1 << 20);
        let before = set.ram_bytes_used();
        assert_eq!(before, (1 << 20) / 8);
        set.add(12345);
        assert_eq!(set.ram_bytes_used(), before);
    }

    #[test]
    fn test_sparse_footprint_tracks_matches() {
        let set = OrdinalSet::sparse(1 << 30);
        assert!(set.ram_bytes_used() < 1024);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_dense_rejects_out_of_range() {
        OrdinalSet::dense(10).add(10);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_sparse_rejects_out_of_range() {
        OrdinalSet::sparse(10).add(10);
    }

    #[test]
    fn test_release_is_idempotent() {
        for mut set in both(1000) {
            set.add(1);
            assert!(set.release() > 0);
            assert!(set.is_released());
            assert_eq!(set.release(), 0);
            assert_eq!(set.kind(), None);
            assert_eq!(set.ram_bytes_used(), 0);
        }
    }

    #[test]
    #[should_panic(expected = "after release")]
    fn test_contains_after_release_panics() {
        let mut set = OrdinalSet::sparse(10);
        set.release();
        set.contains(1);
    }
}
