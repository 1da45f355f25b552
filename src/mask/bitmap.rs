//! Packed active-set encoding: one bit per row ordinal in 64-bit words.

use super::dense::ByteMask;
use super::selection::SelectionVector;

/// A packed bitmap mask: bit `i % 64` of word `i / 64` marks ordinal `i`.
///
/// Invariant: bits at or beyond `len` in the last word are always zero, so
/// word-level operations (population counts, set-bit enumeration) never see
/// phantom rows.
#[derive(Debug, Clone)]
pub struct BitmapMask {
    words: Vec<u64>,
    len: usize,
}

impl BitmapMask {
    /// Creates a bitmap with every row selected.
    #[must_use]
    pub fn all_rows(row_count: usize) -> Self {
        let mut words = vec![u64::MAX; row_count.div_ceil(64)];
        let tail = row_count % 64;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        Self {
            words,
            len: row_count,
        }
    }

    /// Creates a bitmap with no rows selected.
    #[must_use]
    pub fn none(row_count: usize) -> Self {
        Self {
            words: vec![0; row_count.div_ceil(64)],
            len: row_count,
        }
    }

    /// Membership test for `ordinal`.
    #[inline]
    #[must_use]
    pub fn get(&self, ordinal: usize) -> bool {
        (self.words[ordinal / 64] >> (ordinal % 64)) & 1 != 0
    }

    /// Sets the membership of `ordinal`.
    #[inline]
    pub fn set(&mut self, ordinal: usize, selected: bool) {
        let bit = 1u64 << (ordinal % 64);
        if selected {
            self.words[ordinal / 64] |= bit;
        } else {
            self.words[ordinal / 64] &= !bit;
        }
    }

    /// Number of rows covered by the bitmap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the bitmap covers no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of selected rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// The raw words.
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Mutable access to the words, for kernels writing in place. Callers
    /// must keep bits at or beyond `len` zero.
    #[must_use]
    pub fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// Visits the selected ordinals in increasing order.
    ///
    /// Skips zero words, then repeatedly clears the lowest set bit
    /// (`word &= word - 1`) so the cost is proportional to the number of set
    /// bits plus the number of words, not the row count.
    pub fn for_each_selected(&self, mut action: impl FnMut(u32)) {
        for (w, &stored) in self.words.iter().enumerate() {
            let base = (w * 64) as u32;
            let mut word = stored;
            while word != 0 {
                let offset = word.trailing_zeros();
                action(base + offset);
                word &= word - 1;
            }
        }
    }

    /// Converts to a position list in increasing ordinal order.
    #[must_use]
    pub fn to_selection(&self) -> SelectionVector {
        let mut positions = Vec::with_capacity(self.count());
        self.for_each_selected(|p| positions.push(p));
        SelectionVector::from_positions(positions)
    }

    /// Converts to a dense byte mask.
    #[must_use]
    pub fn to_byte_mask(&self) -> ByteMask {
        let mut mask = ByteMask::none(self.len);
        self.for_each_selected(|p| mask.set(p as usize, true));
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rows_clears_tail_bits() {
        let mask = BitmapMask::all_rows(70);
        assert_eq!(mask.count(), 70);
        assert_eq!(mask.words().len(), 2);
        assert_eq!(mask.words()[1], (1u64 << 6) - 1);
    }

    #[test]
    fn test_all_rows_exact_word_boundary() {
        let mask = BitmapMask::all_rows(128);
        assert_eq!(mask.words(), &[u64::MAX, u64::MAX]);
        assert_eq!(mask.count(), 128);
    }

    #[test]
    fn test_set_get_across_words() {
        let mut mask = BitmapMask::none(130);
        mask.set(0, true);
        mask.set(63, true);
        mask.set(64, true);
        mask.set(129, true);
        assert!(mask.get(63));
        assert!(mask.get(64));
        assert!(!mask.get(65));
        mask.set(64, false);
        assert!(!mask.get(64));
        assert_eq!(mask.count(), 3);
    }

    #[test]
    fn test_to_selection_increasing_and_sparse_cost_path() {
        let mut mask = BitmapMask::none(200);
        for &i in &[199, 3, 64, 127] {
            mask.set(i, true);
        }
        let sel = mask.to_selection();
        assert_eq!(sel.positions(), &[3, 64, 127, 199]);
    }

    #[test]
    fn test_for_each_selected_empty_words_skipped() {
        let mask = BitmapMask::none(256);
        let mut visited = 0;
        mask.for_each_selected(|_| visited += 1);
        assert_eq!(visited, 0);
    }
}
