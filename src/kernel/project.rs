//! Product projection over the final active set.
//!
//! Writes `result[p] = a[p] * b[p]` for every surviving ordinal `p`, in each
//! of the three operating representations. Slots for non-surviving ordinals
//! keep whatever they previously held; callers must not read them. The
//! null-aware variants also emit a result validity byte per survivor, the OR
//! of the operand validity bytes, and skip the multiply when the result is
//! null so a placeholder operand never leaks into the output.

/// Dense projection driven by a byte mask.
pub fn product_dense(mask: &[u8], a: &[i64], b: &[i64], result: &mut [i64]) {
    for (i, &m) in mask.iter().enumerate() {
        if m != 0 {
            result[i] = a[i] * b[i];
        }
    }
}

/// Sparse projection driven by a position list.
pub fn product_selection(positions: &[u32], a: &[i64], b: &[i64], result: &mut [i64]) {
    for &p in positions {
        let p = p as usize;
        result[p] = a[p] * b[p];
    }
}

/// Bitmap projection: enumerates set bits per word and multiplies the values
/// at each surviving ordinal.
pub fn product_bitmap(words: &[u64], row_count: usize, a: &[i64], b: &[i64], result: &mut [i64]) {
    for (w, &stored) in words.iter().enumerate() {
        let base = w * 64;
        let mut word = stored;
        while word != 0 {
            let ordinal = base + word.trailing_zeros() as usize;
            if ordinal >= row_count {
                break;
            }
            result[ordinal] = a[ordinal] * b[ordinal];
            word &= word - 1;
        }
    }
}

/// Null-aware dense projection.
///
/// For each selected ordinal, writes `result_validity[i] = a_null | b_null`
/// and computes the product only when both operands are present.
#[allow(clippy::too_many_arguments)]
pub fn product_dense_nullable(
    mask: &[u8],
    a: &[i64],
    a_validity: Option<&[u8]>,
    b: &[i64],
    b_validity: Option<&[u8]>,
    result: &mut [i64],
    result_validity: &mut [u8],
) {
    // Resolve the validity combination once; the loops monomorphize per case.
    match (a_validity, b_validity) {
        (None, None) => dense_nullable(mask, a, b, result, result_validity, |_| 0),
        (Some(av), None) => dense_nullable(mask, a, b, result, result_validity, |i| av[i]),
        (None, Some(bv)) => dense_nullable(mask, a, b, result, result_validity, |i| bv[i]),
        (Some(av), Some(bv)) => {
            dense_nullable(mask, a, b, result, result_validity, |i| av[i] | bv[i]);
        }
    }
}

/// Null-aware sparse projection.
#[allow(clippy::too_many_arguments)]
pub fn product_selection_nullable(
    positions: &[u32],
    a: &[i64],
    a_validity: Option<&[u8]>,
    b: &[i64],
    b_validity: Option<&[u8]>,
    result: &mut [i64],
    result_validity: &mut [u8],
) {
    match (a_validity, b_validity) {
        (None, None) => selection_nullable(positions, a, b, result, result_validity, |_| 0),
        (Some(av), None) => selection_nullable(positions, a, b, result, result_validity, |i| av[i]),
        (None, Some(bv)) => selection_nullable(positions, a, b, result, result_validity, |i| bv[i]),
        (Some(av), Some(bv)) => {
            selection_nullable(positions, a, b, result, result_validity, |i| av[i] | bv[i]);
        }
    }
}

/// Null-aware bitmap projection.
#[allow(clippy::too_many_arguments)]
pub fn product_bitmap_nullable(
    words: &[u64],
    row_count: usize,
    a: &[i64],
    a_validity: Option<&[u8]>,
    b: &[i64],
    b_validity: Option<&[u8]>,
    result: &mut [i64],
    result_validity: &mut [u8],
) {
    match (a_validity, b_validity) {
        (None, None) => bitmap_nullable(words, row_count, a, b, result, result_validity, |_| 0),
        (Some(av), None) => {
            bitmap_nullable(words, row_count, a, b, result, result_validity, |i| av[i]);
        }
        (None, Some(bv)) => {
            bitmap_nullable(words, row_count, a, b, result, result_validity, |i| bv[i]);
        }
        (Some(av), Some(bv)) => {
            bitmap_nullable(words, row_count, a, b, result, result_validity, |i| {
                av[i] | bv[i]
            });
        }
    }
}

#[inline]
fn dense_nullable(
    mask: &[u8],
    a: &[i64],
    b: &[i64],
    result: &mut [i64],
    result_validity: &mut [u8],
    null_at: impl Fn(usize) -> u8,
) {
    for (i, &m) in mask.iter().enumerate() {
        if m != 0 {
            let null = null_at(i);
            result_validity[i] = null;
            if null == 0 {
                result[i] = a[i] * b[i];
            }
        }
    }
}

#[inline]
fn selection_nullable(
    positions: &[u32],
    a: &[i64],
    b: &[i64],
    result: &mut [i64],
    result_validity: &mut [u8],
    null_at: impl Fn(usize) -> u8,
) {
    for &p in positions {
        let p = p as usize;
        let null = null_at(p);
        result_validity[p] = null;
        if null == 0 {
            result[p] = a[p] * b[p];
        }
    }
}

#[inline]
#[allow(clippy::too_many_arguments)]
fn bitmap_nullable(
    words: &[u64],
    row_count: usize,
    a: &[i64],
    b: &[i64],
    result: &mut [i64],
    result_validity: &mut [u8],
    null_at: impl Fn(usize) -> u8,
) {
    for (w, &stored) in words.iter().enumerate() {
        let base = w * 64;
        let mut word = stored;
        while word != 0 {
            let ordinal = base + word.trailing_zeros() as usize;
            if ordinal >= row_count {
                break;
            }
            let null = null_at(ordinal);
            result_validity[ordinal] = null;
            if null == 0 {
                result[ordinal] = a[ordinal] * b[ordinal];
            }
            word &= word - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::NULL;
    use crate::mask::SelectionVector;

    const UNTOUCHED: i64 = -999;

    #[test]
    fn test_product_dense_writes_survivors_only() {
        let a = [1i64, 2, 3, 4];
        let b = [10i64, 20, 30, 40];
        let mask = [0u8, 1, 1, 0];
        let mut result = [UNTOUCHED; 4];
        product_dense(&mask, &a, &b, &mut result);
        assert_eq!(result, [UNTOUCHED, 40, 90, UNTOUCHED]);
    }

    #[test]
    fn test_all_representations_agree() {
        let a: Vec<i64> = (1..=100).collect();
        let b: Vec<i64> = (1..=100).map(|v| v * 3).collect();
        let sel = SelectionVector::from_positions((0..100).filter(|p| p % 3 == 0).collect());

        let mut dense_result = vec![UNTOUCHED; 100];
        product_dense(sel.to_byte_mask(100).as_slice(), &a, &b, &mut dense_result);

        let mut sparse_result = vec![UNTOUCHED; 100];
        product_selection(sel.positions(), &a, &b, &mut sparse_result);

        let mut bitmap_result = vec![UNTOUCHED; 100];
        product_bitmap(sel.to_bitmap(100).words(), 100, &a, &b, &mut bitmap_result);

        assert_eq!(dense_result, sparse_result);
        assert_eq!(dense_result, bitmap_result);
    }

    #[test]
    fn test_nullable_skips_multiply_and_sets_validity() {
        let a = [2i64, 3, 4];
        let a_validity = [0u8, NULL, 0];
        let b = [5i64, 7, 11];
        let positions = [0u32, 1, 2];
        let mut result = [UNTOUCHED; 3];
        let mut result_validity = [9u8; 3];

        product_selection_nullable(
            &positions,
            &a,
            Some(&a_validity),
            &b,
            None,
            &mut result,
            &mut result_validity,
        );

        assert_eq!(result, [10, UNTOUCHED, 44]);
        assert_eq!(result_validity, [0, NULL, 0]);
    }

    #[test]
    fn test_nullable_or_of_both_operands() {
        let a = [1i64, 1, 1, 1];
        let a_validity = [NULL, 0, NULL, 0];
        let b = [2i64, 2, 2, 2];
        let b_validity = [0u8, NULL, NULL, 0];
        let mask = [1u8; 4];
        let mut result = [UNTOUCHED; 4];
        let mut result_validity = [9u8; 4];

        product_dense_nullable(
            &mask,
            &a,
            Some(&a_validity),
            &b,
            Some(&b_validity),
            &mut result,
            &mut result_validity,
        );

        assert_eq!(result_validity, [NULL, NULL, NULL, 0]);
        assert_eq!(result[3], 2);
        assert_eq!(result[0], UNTOUCHED);
    }

    #[test]
    fn test_bitmap_nullable_matches_dense_nullable() {
        let a: Vec<i64> = (0..70).collect();
        let av: Vec<u8> = (0..70).map(|i| u8::from(i % 5 == 0)).collect();
        let b: Vec<i64> = (0..70).map(|v| v + 1).collect();
        let sel = SelectionVector::from_positions((0..70).filter(|p| p % 2 == 0).collect());

        let mut dense_result = vec![UNTOUCHED; 70];
        let mut dense_validity = vec![9u8; 70];
        product_dense_nullable(
            sel.to_byte_mask(70).as_slice(),
            &a,
            Some(&av),
            &b,
            None,
            &mut dense_result,
            &mut dense_validity,
        );

        let mut bm_result = vec![UNTOUCHED; 70];
        let mut bm_validity = vec![9u8; 70];
        product_bitmap_nullable(
            sel.to_bitmap(70).words(),
            70,
            &a,
            Some(&av),
            &b,
            None,
            &mut bm_result,
            &mut bm_validity,
        );

        assert_eq!(dense_result, bm_result);
        assert_eq!(dense_validity, bm_validity);
    }
}
