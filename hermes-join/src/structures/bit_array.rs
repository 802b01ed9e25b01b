//! Fixed-capacity bit vector
//!
//! One bit per slot, packed into `u64` words. Memory is `ceil(len / 64) * 8`
//! bytes no matter how many bits are set, so it only pays off when a large
//! fraction of the slots is expected to be touched.

use std::mem::size_of;

const WORD_BITS: usize = 64;

/// Dense bit vector of exactly `len` bits, all initially clear.
#[derive(Debug, Clone, Default)]
pub struct BitArray {
    words: Vec<u64>,
    len: usize,
}

impl BitArray {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set bit `index`. Returns true if it was previously clear.
    #[inline]
    pub fn set(&mut self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bit index {} out of bounds for BitArray of {} bits",
            index,
            self.len
        );
        let word = &mut self.words[index / WORD_BITS];
        let mask = 1u64 << (index % WORD_BITS);
        let was_clear = *word & mask == 0;
        *word |= mask;
        was_clear
    }

    /// Read bit `index`. Out-of-range indices read as clear.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Clear bit `index`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        if index < self.len {
            self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
        }
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * WORD_BITS + bit)
            })
        })
    }

    /// Heap bytes held by the word array.
    pub fn ram_bytes_used(&self) -> usize {
        self.words.capacity() * size_of::<u64>()
    }
}
