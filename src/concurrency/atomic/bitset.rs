//! Branded atomic bitsets.
//!
//! This is a dense alternative to `Vec<AtomicBool>` for visited sets / flags.
//! Bits are only ever set, never cleared, while the set is shared; a cleared
//! set is obtained by building a new one (or through `&mut self`).

use core::sync::atomic::Ordering;

use super::GhostAtomicUsize;
use crate::GhostToken;

/// Number of bits per bitset word.
pub const WORD_BITS: usize = usize::BITS as usize;

/// A branded, word-packed atomic bitset.
pub struct GhostAtomicBitset<'brand> {
    bits: usize,
    words: Box<[GhostAtomicUsize<'brand>]>,
}

impl<'brand> GhostAtomicBitset<'brand> {
    /// Creates a new bitset with `bits` bits, all cleared.
    pub fn new(_token: &GhostToken<'brand>, bits: usize) -> Self {
        let words_len = bits.div_ceil(WORD_BITS);
        let words = (0..words_len).map(|_| GhostAtomicUsize::new(0)).collect();
        Self { bits, words }
    }

    /// Number of bits.
    pub fn len_bits(&self) -> usize {
        self.bits
    }

    /// Number of backing words (`ceil(len_bits / WORD_BITS)`).
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn is_set(&self, bit: usize) -> bool {
        let (_, mask) = bit_word_mask(bit);
        (self.load_word(bit) & mask) != 0
    }

    /// Loads the word containing `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline(always)]
    pub fn load_word(&self, bit: usize) -> usize {
        assert!(bit < self.bits, "bit {bit} out of bounds for {}", self.bits);
        let (word, _) = bit_word_mask(bit);
        self.words[word].load(Ordering::Relaxed)
    }

    /// Sets `bit` and returns `true` iff this call performed the 0 -> 1 transition.
    ///
    /// Loops reading the word, returning `false` as soon as the bit is observed
    /// set, and otherwise attempting `old -> old | bit` until the CAS lands.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn try_claim(&self, bit: usize) -> bool {
        let observed = self.load_word(bit);
        self.try_claim_from(observed, bit)
    }

    /// Like [`try_claim`](Self::try_claim), starting from a word value the
    /// caller loaded earlier (see [`load_word`](Self::load_word)).
    ///
    /// A stale `observed` only costs a failed CAS; the result is exact.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn try_claim_from(&self, observed: usize, bit: usize) -> bool {
        assert!(bit < self.bits, "bit {bit} out of bounds for {}", self.bits);
        let (word, mask) = bit_word_mask(bit);
        let slot = &self.words[word];
        let mut old = observed;
        loop {
            if old & mask != 0 {
                return false;
            }
            match slot.compare_exchange_weak(old, old | mask, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return true,
                Err(current) => old = current,
            }
        }
    }

    /// Number of set bits. Only meaningful once concurrent claims have finished.
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }
}

#[inline(always)]
fn bit_word_mask(bit: usize) -> (usize, usize) {
    // `usize::BITS` is always a power-of-two (32 or 64), so use shifts/masks.
    // This is on the hot path for graph traversal.
    let shift = WORD_BITS.trailing_zeros();
    (bit >> shift, 1usize << (bit & (WORD_BITS - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_first_writer_wins() {
        GhostToken::new(|token| {
            let b = GhostAtomicBitset::new(&token, 130);
            assert_eq!(b.len_bits(), 130);
            assert_eq!(b.len_words(), 130usize.div_ceil(WORD_BITS));

            assert!(!b.is_set(0));
            assert!(b.try_claim(0));
            assert!(b.is_set(0));
            assert!(!b.try_claim(0));

            assert!(b.try_claim(129));
            assert!(!b.try_claim(129));
            assert_eq!(b.count_ones(), 2);
        });
    }

    #[test]
    fn claim_from_stale_word_is_still_exact() {
        GhostToken::new(|token| {
            let b = GhostAtomicBitset::new(&token, 64);
            let stale = b.load_word(5);
            assert!(b.try_claim(6));
            // `stale` predates the claim of bit 6; the CAS must retry, not lose bit 6.
            assert!(b.try_claim_from(stale, 5));
            assert!(b.is_set(5));
            assert!(b.is_set(6));
            assert!(!b.try_claim_from(stale, 6));
        });
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_range_claim_panics() {
        GhostToken::new(|token| {
            let b = GhostAtomicBitset::new(&token, 10);
            b.try_claim(10);
        });
    }
}
