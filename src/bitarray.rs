//! Net Bit Array
//!
//! Fixed-capacity bitset keyed by `u32` indices. Used for the valid-connection
//! set, the per-tick open-connection set, and per-group dirty tracking.

const WORD_BITS: u32 = 64;

/// Fixed-capacity bitset over `u32` indices.
///
/// Trailing bits of the last word are kept at zero, so two bit arrays of the
/// same capacity compare equal exactly when their set bits match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetBitArray {
    words: Vec<u64>,
    bit_count: u32,
}

impl NetBitArray {
    /// Create a bit array with capacity for `bit_count` bits, all cleared.
    pub fn new(bit_count: u32) -> Self {
        let word_count = bit_count.div_ceil(WORD_BITS) as usize;
        Self {
            words: vec![0; word_count],
            bit_count,
        }
    }

    /// Number of addressable bits.
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Set the bit at `index`.
    ///
    /// Panics if `index` is out of range.
    pub fn set_bit(&mut self, index: u32) {
        self.check_index(index);
        self.words[(index / WORD_BITS) as usize] |= 1u64 << (index % WORD_BITS);
    }

    /// Clear the bit at `index`.
    ///
    /// Panics if `index` is out of range.
    pub fn clear_bit(&mut self, index: u32) {
        self.check_index(index);
        self.words[(index / WORD_BITS) as usize] &= !(1u64 << (index % WORD_BITS));
    }

    /// Check whether the bit at `index` is set.
    ///
    /// Panics if `index` is out of range.
    pub fn is_bit_set(&self, index: u32) -> bool {
        self.check_index(index);
        self.words[(index / WORD_BITS) as usize] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Number of set bits.
    pub fn count_set_bits(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// True if any bit is set.
    pub fn is_any_set(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// Clear all bits.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Iterate over the indices of all set bits, in ascending order.
    pub fn iter_set_bits(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, word)| {
            let mut word = *word;
            std::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let bit = word.trailing_zeros();
                word &= word - 1;
                Some(word_idx as u32 * WORD_BITS + bit)
            })
        })
    }

    /// Invoke `f` for every set bit, in ascending index order.
    pub fn for_each_set_bit<F: FnMut(u32)>(&self, mut f: F) {
        for index in self.iter_set_bits() {
            f(index);
        }
    }

    fn check_index(&self, index: u32) {
        assert!(
            index < self.bit_count,
            "bit index {} out of range (capacity {})",
            index,
            self.bit_count
        );
    }
}
