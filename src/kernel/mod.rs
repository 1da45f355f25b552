//! Predicate and projection kernels over the active-set encodings.
//!
//! Each representation has its own operator family (dense byte mask, packed
//! bitmap, sparse position list); all of them narrow the active set in
//! original row order and treat an empty set as a zero-iteration no-op. The
//! loops carry no bounds or type validation beyond what safe indexing
//! implies; length agreement is established when the batch and pipeline are
//! built.

pub mod bitmap;
pub mod compact;
pub mod dense;
pub mod project;

pub use compact::CompactionMode;

use std::cmp::Ordering;

/// Range-comparison operator for a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Greater than or equal to the literal.
    GtEq,
    /// Less than or equal to the literal.
    LtEq,
    /// Strictly less than the literal.
    Lt,
}

impl CmpOp {
    /// Applies the operator to an integer value.
    #[inline]
    #[must_use]
    pub fn matches_i64(self, value: i64, literal: i64) -> bool {
        match self {
            Self::GtEq => value >= literal,
            Self::LtEq => value <= literal,
            Self::Lt => value < literal,
        }
    }

    /// Applies the operator to a byte-string value, comparing unsigned
    /// lexicographically. Equal-length encodings such as `YYYY-MM-DD` date
    /// strings order correctly under this rule without any parsing.
    #[inline]
    #[must_use]
    pub fn matches_bytes(self, value: &[u8], literal: &[u8]) -> bool {
        let ord = value.cmp(literal);
        match self {
            Self::GtEq => ord != Ordering::Less,
            Self::LtEq => ord != Ordering::Greater,
            Self::Lt => ord == Ordering::Less,
        }
    }
}

/// The byte-string span of row `ordinal` in a flat buffer.
#[inline]
#[must_use]
pub(crate) fn row_bytes<'a>(data: &'a [u8], offsets: &[u32], ordinal: usize) -> &'a [u8] {
    &data[offsets[ordinal] as usize..offsets[ordinal + 1] as usize]
}
