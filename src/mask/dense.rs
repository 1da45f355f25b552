//! Dense active-set encodings: one boolean or one byte per row ordinal.

use super::bitmap::BitmapMask;
use super::selection::SelectionVector;

/// A dense boolean mask, indexed directly by row ordinal.
#[derive(Debug, Clone)]
pub struct DenseMask {
    bits: Vec<bool>,
}

impl DenseMask {
    /// Creates a mask with every row selected.
    #[must_use]
    pub fn all_rows(row_count: usize) -> Self {
        Self {
            bits: vec![true; row_count],
        }
    }

    /// Creates a mask with no rows selected.
    #[must_use]
    pub fn none(row_count: usize) -> Self {
        Self {
            bits: vec![false; row_count],
        }
    }

    /// Membership test for `ordinal`.
    #[inline]
    #[must_use]
    pub fn get(&self, ordinal: usize) -> bool {
        self.bits[ordinal]
    }

    /// Sets the membership of `ordinal`.
    #[inline]
    pub fn set(&mut self, ordinal: usize, selected: bool) {
        self.bits[ordinal] = selected;
    }

    /// Number of rows covered by the mask.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if the mask covers no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of selected rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// The raw boolean slice.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Iterates the selected ordinals in increasing order.
    pub fn iter_selected(&self) -> impl Iterator<Item = u32> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| i as u32)
    }

    /// Converts to the byte-valued form used by the vectorizable kernels.
    #[must_use]
    pub fn to_byte_mask(&self) -> ByteMask {
        ByteMask {
            bytes: self.bits.iter().map(|&b| u8::from(b)).collect(),
        }
    }

    /// Converts to a position list. Scans all ordinals; cost is O(rows)
    /// regardless of selectivity.
    #[must_use]
    pub fn to_selection(&self) -> SelectionVector {
        SelectionVector::from_positions(self.iter_selected().collect())
    }
}

/// A dense byte mask (`0`/`1` per row), the form the branch-free kernels
/// operate on: selections combine by bitwise AND instead of control flow.
#[derive(Debug, Clone)]
pub struct ByteMask {
    bytes: Vec<u8>,
}

impl ByteMask {
    /// Creates a mask with every row selected.
    #[must_use]
    pub fn all_rows(row_count: usize) -> Self {
        Self {
            bytes: vec![1; row_count],
        }
    }

    /// Creates a mask with no rows selected.
    #[must_use]
    pub fn none(row_count: usize) -> Self {
        Self {
            bytes: vec![0; row_count],
        }
    }

    /// Wraps existing `0`/`1` bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Membership test for `ordinal`.
    #[inline]
    #[must_use]
    pub fn get(&self, ordinal: usize) -> bool {
        self.bytes[ordinal] != 0
    }

    /// Sets the membership of `ordinal`.
    #[inline]
    pub fn set(&mut self, ordinal: usize, selected: bool) {
        self.bytes[ordinal] = u8::from(selected);
    }

    /// Number of rows covered by the mask.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the mask covers no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of selected rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bytes.iter().map(|&b| usize::from(b)).sum()
    }

    /// The raw mask bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable access to the mask bytes, for kernels writing in place.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Iterates the selected ordinals in increasing order.
    pub fn iter_selected(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes
            .iter()
            .enumerate()
            .filter(|(_, &b)| b != 0)
            .map(|(i, _)| i as u32)
    }

    /// Converts to the boolean form.
    #[must_use]
    pub fn to_dense(&self) -> DenseMask {
        let mut mask = DenseMask::none(self.bytes.len());
        for (i, &b) in self.bytes.iter().enumerate() {
            mask.set(i, b != 0);
        }
        mask
    }

    /// Converts to a packed bitmap.
    #[must_use]
    pub fn to_bitmap(&self) -> BitmapMask {
        let mut mask = BitmapMask::none(self.bytes.len());
        for (i, &b) in self.bytes.iter().enumerate() {
            if b != 0 {
                mask.set(i, true);
            }
        }
        mask
    }

    /// Converts to a position list. Scans all ordinals; cost is O(rows)
    /// regardless of selectivity.
    #[must_use]
    pub fn to_selection(&self) -> SelectionVector {
        SelectionVector::from_positions(self.iter_selected().collect())
    }
}
