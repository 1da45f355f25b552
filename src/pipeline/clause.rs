//! Filter clause descriptors and their bound, batch-resolved form.
//!
//! A [`FilterClause`] names a column, a comparison, and a literal. Binding
//! resolves it once per batch into a [`BoundClause`] that holds the concrete
//! column slices, so the per-row loops never look up columns, check types, or
//! dispatch through anything late-bound. Clause kind and operator are matched
//! exactly once per operator application; the inner loops run monomorphized
//! predicate closures.

use crate::column::{Column, ColumnBatch, NULL};
use crate::error::{Result, RowsieveError};
use crate::kernel::{bitmap, compact, dense, row_bytes, CmpOp, CompactionMode};

/// One conjunct of the filter: a predicate over a single column.
#[derive(Debug, Clone)]
pub enum FilterClause {
    /// Integer range comparison against a same-width literal.
    CmpI64 {
        /// Column name.
        column: String,
        /// Comparison operator.
        op: CmpOp,
        /// Comparison literal.
        literal: i64,
    },
    /// Lexicographic byte-string comparison against a fixed literal.
    CmpBytes {
        /// Column name.
        column: String,
        /// Comparison operator.
        op: CmpOp,
        /// Comparison literal.
        literal: Vec<u8>,
    },
    /// Keeps rows where the column value is absent.
    IsNull {
        /// Column name.
        column: String,
    },
    /// Keeps rows where the column value is present.
    IsNotNull {
        /// Column name.
        column: String,
    },
}

impl FilterClause {
    /// `column >= literal` over an integer column.
    #[must_use]
    pub fn gt_eq(column: impl Into<String>, literal: i64) -> Self {
        Self::CmpI64 {
            column: column.into(),
            op: CmpOp::GtEq,
            literal,
        }
    }

    /// `column <= literal` over an integer column.
    #[must_use]
    pub fn lt_eq(column: impl Into<String>, literal: i64) -> Self {
        Self::CmpI64 {
            column: column.into(),
            op: CmpOp::LtEq,
            literal,
        }
    }

    /// `column < literal` over an integer column.
    #[must_use]
    pub fn lt(column: impl Into<String>, literal: i64) -> Self {
        Self::CmpI64 {
            column: column.into(),
            op: CmpOp::Lt,
            literal,
        }
    }

    /// `column >= literal` over a byte-string column.
    #[must_use]
    pub fn bytes_gt_eq(column: impl Into<String>, literal: impl Into<Vec<u8>>) -> Self {
        Self::CmpBytes {
            column: column.into(),
            op: CmpOp::GtEq,
            literal: literal.into(),
        }
    }

    /// `column < literal` over a byte-string column.
    #[must_use]
    pub fn bytes_lt(column: impl Into<String>, literal: impl Into<Vec<u8>>) -> Self {
        Self::CmpBytes {
            column: column.into(),
            op: CmpOp::Lt,
            literal: literal.into(),
        }
    }

    /// Keeps rows where the column is null.
    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
        }
    }

    /// Keeps rows where the column is not null.
    #[must_use]
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull {
            column: column.into(),
        }
    }

    /// The column this clause reads.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::CmpI64 { column, .. }
            | Self::CmpBytes { column, .. }
            | Self::IsNull { column }
            | Self::IsNotNull { column } => column,
        }
    }

    /// Returns true if this clause compares values (as opposed to testing
    /// validity). Value clauses on nullable columns get an implicit
    /// not-null screen at bind time.
    #[must_use]
    pub(crate) fn is_value_clause(&self) -> bool {
        matches!(self, Self::CmpI64 { .. } | Self::CmpBytes { .. })
    }

    /// Resolves this clause against a batch, capturing column slices and the
    /// literal. The bound form borrows only the batch, so the clause itself
    /// may be a temporary.
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` for an unknown column or `TypeError` when the
    /// column's physical type does not match the clause.
    pub(crate) fn bind<'a>(&self, batch: &'a ColumnBatch) -> Result<BoundClause<'a>> {
        let name = self.column();
        let column = batch
            .column(name)
            .ok_or_else(|| RowsieveError::ColumnNotFound(name.to_string()))?;
        match self {
            Self::CmpI64 { op, literal, .. } => match column {
                Column::Int64(c) => Ok(BoundClause::CmpI64 {
                    values: c.values(),
                    op: *op,
                    literal: *literal,
                }),
                other => Err(RowsieveError::TypeError {
                    expected: "int64".to_string(),
                    actual: other.type_name().to_string(),
                }),
            },
            Self::CmpBytes { op, literal, .. } => match column {
                Column::Bytes(c) => Ok(BoundClause::CmpBytes {
                    data: c.data(),
                    offsets: c.offsets(),
                    op: *op,
                    literal: literal.clone(),
                }),
                other => Err(RowsieveError::TypeError {
                    expected: "bytes".to_string(),
                    actual: other.type_name().to_string(),
                }),
            },
            Self::IsNull { .. } => Ok(match column.validity() {
                Some(validity) => BoundClause::NullTest {
                    validity,
                    keep_null: true,
                },
                // Non-null column: nothing is null, nothing survives.
                None => BoundClause::Const { keep: false },
            }),
            Self::IsNotNull { .. } => Ok(match column.validity() {
                Some(validity) => BoundClause::NullTest {
                    validity,
                    keep_null: false,
                },
                None => BoundClause::Const { keep: true },
            }),
        }
    }
}

/// A clause resolved against one batch: column slices plus the literal,
/// captured once and reused for every row. Borrows only batch data; the
/// bytes literal is owned so the source clause can be dropped after binding.
#[derive(Debug, Clone)]
pub(crate) enum BoundClause<'a> {
    CmpI64 {
        values: &'a [i64],
        op: CmpOp,
        literal: i64,
    },
    CmpBytes {
        data: &'a [u8],
        offsets: &'a [u32],
        op: CmpOp,
        literal: Vec<u8>,
    },
    NullTest {
        validity: &'a [u8],
        keep_null: bool,
    },
    /// Null test against a column with no validity array: the outcome is
    /// fixed at bind time.
    Const { keep: bool },
}

/// Resolves a bound clause into a concrete predicate closure and hands it to
/// the expression `$call`. The clause-kind and operator matches run once per
/// invocation, never per row.
macro_rules! with_predicate {
    ($clause:expr, $pred:ident => $call:expr) => {
        match $clause {
            BoundClause::CmpI64 {
                values,
                op,
                literal,
            } => {
                let (values, literal) = (*values, *literal);
                match *op {
                    CmpOp::GtEq => {
                        let $pred = |p: u32| values[p as usize] >= literal;
                        $call
                    }
                    CmpOp::LtEq => {
                        let $pred = |p: u32| values[p as usize] <= literal;
                        $call
                    }
                    CmpOp::Lt => {
                        let $pred = |p: u32| values[p as usize] < literal;
                        $call
                    }
                }
            }
            BoundClause::CmpBytes {
                data,
                offsets,
                op,
                literal,
            } => {
                let (data, offsets, literal) = (*data, *offsets, literal.as_slice());
                match *op {
                    CmpOp::GtEq => {
                        let $pred = |p: u32| row_bytes(data, offsets, p as usize) >= literal;
                        $call
                    }
                    CmpOp::LtEq => {
                        let $pred = |p: u32| row_bytes(data, offsets, p as usize) <= literal;
                        $call
                    }
                    CmpOp::Lt => {
                        let $pred = |p: u32| row_bytes(data, offsets, p as usize) < literal;
                        $call
                    }
                }
            }
            BoundClause::NullTest {
                validity,
                keep_null,
            } => {
                let (validity, keep_null) = (*validity, *keep_null);
                let $pred = |p: u32| (validity[p as usize] == NULL) == keep_null;
                $call
            }
            BoundClause::Const { keep } => {
                let keep = *keep;
                let $pred = |_p: u32| keep;
                $call
            }
        }
    };
}

impl BoundClause<'_> {
    /// Scalar predicate test for one ordinal.
    #[cfg(test)]
    pub(crate) fn test(&self, ordinal: u32) -> bool {
        with_predicate!(self, pred => pred(ordinal))
    }

    /// Narrows a dense byte mask in place.
    pub(crate) fn narrow_mask(&self, mask: &mut [u8]) {
        match self {
            Self::CmpI64 {
                values,
                op,
                literal,
            } => dense::cmp_i64(mask, values, *op, *literal),
            Self::CmpBytes {
                data,
                offsets,
                op,
                literal,
            } => dense::cmp_bytes(mask, data, offsets, *op, literal),
            Self::NullTest {
                validity,
                keep_null: false,
            } => dense::is_not_null(mask, validity),
            Self::NullTest {
                validity,
                keep_null: true,
            } => dense::is_null(mask, validity),
            Self::Const { keep: true } => {}
            Self::Const { keep: false } => mask.fill(0),
        }
    }

    /// Narrows a packed bitmap in place.
    pub(crate) fn narrow_bitmap(&self, words: &mut [u64], row_count: usize) {
        match self {
            Self::CmpI64 {
                values,
                op,
                literal,
            } => bitmap::cmp_i64(words, row_count, values, *op, *literal),
            Self::CmpBytes {
                data,
                offsets,
                op,
                literal,
            } => bitmap::cmp_bytes(words, row_count, data, offsets, *op, literal),
            Self::NullTest {
                validity,
                keep_null: false,
            } => bitmap::is_not_null(words, row_count, validity),
            Self::NullTest {
                validity,
                keep_null: true,
            } => bitmap::is_null(words, row_count, validity),
            Self::Const { keep: true } => {}
            Self::Const { keep: false } => words.fill(0),
        }
    }

    /// Compacts a position list into a separate output buffer.
    pub(crate) fn narrow_selection_into(
        &self,
        input: &[u32],
        output: &mut [u32],
        mode: CompactionMode,
    ) -> usize {
        with_predicate!(self, pred => compact::compact_into(input, output, mode, pred))
    }

    /// Compacts the first `count` entries of a position list in place.
    pub(crate) fn narrow_selection_in_place(
        &self,
        positions: &mut [u32],
        count: usize,
        mode: CompactionMode,
    ) -> usize {
        with_predicate!(self, pred => compact::compact_in_place(positions, count, mode, pred))
    }
}
