//! Sparse active-set encoding: a position list of surviving ordinals.

use super::bitmap::BitmapMask;
use super::dense::{ByteMask, DenseMask};

/// A position list of surviving row ordinals, in strictly increasing order.
///
/// The backing buffer may be larger than the logical length so it can serve
/// as a reusable compaction target; `len` marks how many leading entries are
/// live. Random membership testing is deliberately not supported: a position
/// list is optimized for sequential traversal, and callers needing membership
/// lookups should convert to a dense encoding first.
#[derive(Debug, Clone)]
pub struct SelectionVector {
    positions: Vec<u32>,
    len: usize,
}

impl SelectionVector {
    /// Creates the identity selection over `row_count` rows (all surviving).
    #[must_use]
    pub fn all_rows(row_count: usize) -> Self {
        Self {
            positions: (0..row_count as u32).collect(),
            len: row_count,
        }
    }

    /// Creates a selection from explicit positions; all entries are live.
    #[must_use]
    pub fn from_positions(positions: Vec<u32>) -> Self {
        let len = positions.len();
        Self { positions, len }
    }

    /// Creates an empty selection whose buffer can hold `capacity` positions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![0; capacity],
            len: 0,
        }
    }

    /// Number of surviving ordinals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no rows survive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The live positions.
    #[must_use]
    pub fn positions(&self) -> &[u32] {
        &self.positions[..self.len]
    }

    /// The full backing buffer, including slots past the logical length.
    /// Compaction kernels write through this and then [`Self::set_len`].
    #[must_use]
    pub fn buffer_mut(&mut self) -> &mut [u32] {
        &mut self.positions
    }

    /// Sets the logical length after an in-buffer compaction.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the buffer capacity.
    pub fn set_len(&mut self, len: usize) {
        assert!(len <= self.positions.len());
        self.len = len;
    }

    /// The ordinal at list index `index`, if within the logical length.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.positions().get(index).copied()
    }

    /// Iterates the surviving ordinals in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.positions().iter().copied()
    }

    /// Converts to a dense boolean mask of `row_count` entries.
    #[must_use]
    pub fn to_dense(&self, row_count: usize) -> DenseMask {
        let mut mask = DenseMask::none(row_count);
        for p in self.iter() {
            mask.set(p as usize, true);
        }
        mask
    }

    /// Converts to a dense byte mask of `row_count` entries.
    #[must_use]
    pub fn to_byte_mask(&self, row_count: usize) -> ByteMask {
        let mut mask = ByteMask::none(row_count);
        for p in self.iter() {
            mask.set(p as usize, true);
        }
        mask
    }

    /// Converts to a packed bitmap of `row_count` bits.
    #[must_use]
    pub fn to_bitmap(&self, row_count: usize) -> BitmapMask {
        let mut mask = BitmapMask::none(row_count);
        for p in self.iter() {
            mask.set(p as usize, true);
        }
        mask
    }
}
