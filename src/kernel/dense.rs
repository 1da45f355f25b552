//! Dense-in/dense-out predicate operators over byte masks.
//!
//! Every operator visits all rows and combines the incoming mask byte with
//! the predicate outcome by bitwise AND, so the loops are branch-free by
//! construction and auto-vectorization friendly. Cost is always O(rows),
//! independent of selectivity.

use super::{row_bytes, CmpOp};
use crate::column::NULL;

/// Narrows `mask` in place: `mask[i] &= pred(i)`.
///
/// Generic core shared by every dense operator; each caller binds a concrete
/// predicate closure so the loop monomorphizes without per-row dispatch.
#[inline]
pub fn retain(mask: &mut [u8], pred: impl Fn(usize) -> bool) {
    for (i, m) in mask.iter_mut().enumerate() {
        *m &= u8::from(pred(i));
    }
}

/// Separate-output form: `output[i] = input[i] & pred(i)`.
#[inline]
pub fn retain_into(input: &[u8], output: &mut [u8], pred: impl Fn(usize) -> bool) {
    for (i, (out, &inp)) in output.iter_mut().zip(input).enumerate() {
        *out = inp & u8::from(pred(i));
    }
}

/// Integer range comparison against a same-width literal.
pub fn cmp_i64(mask: &mut [u8], values: &[i64], op: CmpOp, literal: i64) {
    match op {
        CmpOp::GtEq => retain(mask, |i| values[i] >= literal),
        CmpOp::LtEq => retain(mask, |i| values[i] <= literal),
        CmpOp::Lt => retain(mask, |i| values[i] < literal),
    }
}

/// Lexicographic byte-range comparison against a fixed literal.
pub fn cmp_bytes(mask: &mut [u8], data: &[u8], offsets: &[u32], op: CmpOp, literal: &[u8]) {
    match op {
        CmpOp::GtEq => retain(mask, |i| row_bytes(data, offsets, i) >= literal),
        CmpOp::LtEq => retain(mask, |i| row_bytes(data, offsets, i) <= literal),
        CmpOp::Lt => retain(mask, |i| row_bytes(data, offsets, i) < literal),
    }
}

/// Keeps rows whose validity byte is clear (value present).
pub fn is_not_null(mask: &mut [u8], validity: &[u8]) {
    retain(mask, |i| validity[i] != NULL);
}

/// Keeps rows whose validity byte is set (value absent).
pub fn is_null(mask: &mut [u8], validity: &[u8]) {
    retain(mask, |i| validity[i] == NULL);
}
