//! Bitmap-in/bitmap-out predicate operators over packed 64-bit words.
//!
//! Each operator walks the mask one word at a time, enumerating set bits by
//! repeatedly clearing the lowest one (`word &= word - 1`), and assembles the
//! narrowed output word bit by bit. Work is proportional to the number of
//! set bits plus the number of words, so an already-narrow active set stays
//! cheap.

use super::{row_bytes, CmpOp};
use crate::column::NULL;

/// Narrows a packed mask in place, keeping bits whose ordinal satisfies
/// `pred`. Bits beyond `row_count` must already be zero.
#[inline]
pub fn retain(words: &mut [u64], row_count: usize, pred: impl Fn(usize) -> bool) {
    for (w, word_ref) in words.iter_mut().enumerate() {
        let base = w * 64;
        let mut word = *word_ref;
        let mut output = 0u64;
        while word != 0 {
            let offset = word.trailing_zeros();
            let ordinal = base + offset as usize;
            if ordinal >= row_count {
                break;
            }
            output |= u64::from(pred(ordinal)) << offset;
            word &= word - 1;
        }
        *word_ref = output;
    }
}

/// Integer range comparison against a same-width literal.
pub fn cmp_i64(words: &mut [u64], row_count: usize, values: &[i64], op: CmpOp, literal: i64) {
    match op {
        CmpOp::GtEq => retain(words, row_count, |i| values[i] >= literal),
        CmpOp::LtEq => retain(words, row_count, |i| values[i] <= literal),
        CmpOp::Lt => retain(words, row_count, |i| values[i] < literal),
    }
}

/// Lexicographic byte-range comparison against a fixed literal.
pub fn cmp_bytes(
    words: &mut [u64],
    row_count: usize,
    data: &[u8],
    offsets: &[u32],
    op: CmpOp,
    literal: &[u8],
) {
    match op {
        CmpOp::GtEq => retain(words, row_count, |i| row_bytes(data, offsets, i) >= literal),
        CmpOp::LtEq => retain(words, row_count, |i| row_bytes(data, offsets, i) <= literal),
        CmpOp::Lt => retain(words, row_count, |i| row_bytes(data, offsets, i) < literal),
    }
}

/// Keeps rows whose validity byte is clear (value present).
pub fn is_not_null(words: &mut [u64], row_count: usize, validity: &[u8]) {
    retain(words, row_count, |i| validity[i] != NULL);
}

/// Keeps rows whose validity byte is set (value absent).
pub fn is_null(words: &mut [u64], row_count: usize, validity: &[u8]) {
    retain(words, row_count, |i| validity[i] == NULL);
}

/// Total selected rows in a packed mask.
#[must_use]
pub fn count(words: &[u64]) -> usize {
    words.iter().map(|w| w.count_ones() as usize).sum()
}
