//! Active-set representations and the conversions between them.
//!
//! The active set is the monotonically shrinking set of row ordinals still
//! satisfying every predicate applied so far. Four encodings are supported:
//! a dense boolean mask, a dense byte mask, a packed 64-bit bitmap, and a
//! sparse position list. All conversions preserve increasing ordinal order.

pub mod bitmap;
pub mod dense;
pub mod selection;

pub use bitmap::BitmapMask;
pub use dense::{ByteMask, DenseMask};
pub use selection::SelectionVector;

/// An active set in any of the four encodings.
///
/// Used to hand a pre-filtered initial state to a pipeline; the driver
/// re-encodes it into whichever representation its strategy runs on.
#[derive(Debug, Clone)]
pub enum ActiveSet {
    /// Dense boolean mask.
    Dense(DenseMask),
    /// Dense byte mask.
    Bytes(ByteMask),
    /// Packed bitmap.
    Bitmap(BitmapMask),
    /// Sparse position list.
    Selection(SelectionVector),
}

impl ActiveSet {
    /// Number of surviving ordinals.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Dense(m) => m.count(),
            Self::Bytes(m) => m.count(),
            Self::Bitmap(m) => m.count(),
            Self::Selection(s) => s.len(),
        }
    }

    /// Writes this set as `0`/`1` bytes into a caller-owned mask buffer.
    pub fn write_byte_mask(&self, out: &mut [u8]) {
        match self {
            Self::Dense(m) => {
                for (o, &b) in out.iter_mut().zip(m.as_slice()) {
                    *o = u8::from(b);
                }
            }
            Self::Bytes(m) => out.copy_from_slice(m.as_slice()),
            Self::Bitmap(m) => {
                out.fill(0);
                m.for_each_selected(|p| out[p as usize] = 1);
            }
            Self::Selection(s) => {
                out.fill(0);
                for p in s.iter() {
                    out[p as usize] = 1;
                }
            }
        }
    }

    /// Writes this set as packed words into a caller-owned bitmap buffer
    /// covering `row_count` rows.
    pub fn write_bitmap(&self, out: &mut [u64], row_count: usize) {
        if let Self::Bitmap(m) = self {
            out.copy_from_slice(m.words());
            return;
        }
        out.fill(0);
        let mut set = |p: u32| {
            debug_assert!((p as usize) < row_count);
            out[p as usize / 64] |= 1u64 << (p % 64);
        };
        match self {
            Self::Dense(m) => m.iter_selected().for_each(&mut set),
            Self::Bytes(m) => m.iter_selected().for_each(&mut set),
            Self::Selection(s) => s.iter().for_each(&mut set),
            Self::Bitmap(_) => unreachable!(),
        }
    }

    /// Writes this set as a position list into a caller-owned buffer,
    /// returning the surviving count. Positions come out strictly increasing.
    #[must_use]
    pub fn write_selection(&self, out: &mut [u32]) -> usize {
        let mut n = 0;
        let mut push = |p: u32| {
            out[n] = p;
            n += 1;
        };
        match self {
            Self::Dense(m) => m.iter_selected().for_each(&mut push),
            Self::Bytes(m) => m.iter_selected().for_each(&mut push),
            Self::Bitmap(m) => m.for_each_selected(push),
            Self::Selection(s) => s.iter().for_each(&mut push),
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ActiveSet> {
        let sel = SelectionVector::from_positions(vec![1, 3, 4]);
        vec![
            ActiveSet::Dense(sel.to_dense(6)),
            ActiveSet::Bytes(sel.to_byte_mask(6)),
            ActiveSet::Bitmap(sel.to_bitmap(6)),
            ActiveSet::Selection(sel),
        ]
    }

    #[test]
    fn test_count_agrees_across_encodings() {
        for set in sample() {
            assert_eq!(set.count(), 3);
        }
    }

    #[test]
    fn test_write_byte_mask_equivalent() {
        for set in sample() {
            let mut out = vec![9u8; 6];
            set.write_byte_mask(&mut out);
            assert_eq!(out, vec![0, 1, 0, 1, 1, 0]);
        }
    }

    #[test]
    fn test_write_bitmap_equivalent() {
        for set in sample() {
            let mut out = vec![u64::MAX; 1];
            set.write_bitmap(&mut out, 6);
            assert_eq!(out[0], 0b11010);
        }
    }

    #[test]
    fn test_write_selection_equivalent() {
        for set in sample() {
            let mut out = vec![0u32; 6];
            let n = set.write_selection(&mut out);
            assert_eq!(&out[..n], &[1, 3, 4]);
        }
    }
}
