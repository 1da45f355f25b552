//! Pipeline assembly, bind-once resolution, and batch evaluation.
//!
//! A [`Pipeline`] is the declarative plan: filter clauses in application
//! order plus one projection. [`Pipeline::bind`] resolves every clause and
//! both projection operands against a batch exactly once, producing a
//! [`BoundPipeline`] that evaluates any number of times against reusable
//! [`EvalScratch`] buffers without allocating.

use std::mem;

use crate::column::{Column, ColumnBatch};
use crate::error::{Result, RowsieveError};
use crate::kernel::{bitmap, project, CompactionMode};
use crate::mask::ActiveSet;
use crate::pipeline::clause::{BoundClause, FilterClause};

/// Which active-set representation carries rows between clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One byte per row, narrowed in place.
    DenseBytes,
    /// One bit per row in 64-bit words, narrowed in place.
    Bitmap,
    /// Explicit sorted position list, compacted clause by clause.
    #[default]
    Selection,
}

/// Evaluation knobs. All have defaults tuned for selective filters.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    strategy: Strategy,
    compaction: CompactionMode,
    sparse_in_place: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Selection,
            compaction: CompactionMode::BranchFree,
            sparse_in_place: true,
        }
    }
}

impl PipelineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the active-set representation.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Selects branching or branch-free compaction for the selection
    /// strategy. Ignored by the dense strategies.
    #[must_use]
    pub fn with_compaction(mut self, compaction: CompactionMode) -> Self {
        self.compaction = compaction;
        self
    }

    /// Chooses between in-place compaction of a single position list and
    /// ping-pong compaction across two buffers.
    #[must_use]
    pub fn with_sparse_in_place(mut self, in_place: bool) -> Self {
        self.sparse_in_place = in_place;
        self
    }

    /// The configured representation.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// The arithmetic projection computed for surviving rows.
///
/// Only the two-operand product is supported; both operands must be integer
/// columns of the batch.
#[derive(Debug, Clone)]
pub struct Projection {
    left: String,
    right: String,
}

impl Projection {
    /// `left * right` per surviving row.
    #[must_use]
    pub fn product(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    fn bind<'a>(&self, batch: &'a ColumnBatch) -> Result<BoundProjection<'a>> {
        let resolve = |name: &str| -> Result<&'a crate::column::Int64Column> {
            match batch
                .column(name)
                .ok_or_else(|| RowsieveError::ColumnNotFound(name.to_string()))?
            {
                Column::Int64(c) => Ok(c),
                other => Err(RowsieveError::TypeError {
                    expected: "int64".to_string(),
                    actual: other.type_name().to_string(),
                }),
            }
        };
        let left = resolve(&self.left)?;
        let right = resolve(&self.right)?;
        Ok(BoundProjection {
            a: left.values(),
            a_validity: left.validity(),
            b: right.values(),
            b_validity: right.validity(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundProjection<'a> {
    a: &'a [i64],
    a_validity: Option<&'a [u8]>,
    b: &'a [i64],
    b_validity: Option<&'a [u8]>,
}

/// A filter-then-project plan, independent of any batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    clauses: Vec<FilterClause>,
    projection: Projection,
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline with no filter clauses and the default
    /// configuration. With no clauses every row survives into the
    /// projection.
    #[must_use]
    pub fn new(projection: Projection) -> Self {
        Self {
            clauses: Vec::new(),
            projection,
            config: PipelineConfig::default(),
        }
    }

    /// Appends a filter clause. Clauses apply in insertion order and are
    /// combined conjunctively.
    #[must_use]
    pub fn filter(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Overrides the evaluation configuration.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves every clause and both projection operands against `batch`.
    /// The bound pipeline borrows only the batch, so the pipeline itself may
    /// be a temporary and may be dropped before evaluation.
    ///
    /// Value clauses over nullable columns get an implicit not-null screen
    /// prepended (once per column), so a null operand can never reach a
    /// comparison.
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` or `TypeError` when a clause or projection
    /// operand does not resolve.
    pub fn bind<'a>(&self, batch: &'a ColumnBatch) -> Result<BoundPipeline<'a>> {
        let mut bound = Vec::with_capacity(self.clauses.len());
        let mut screened: Vec<&str> = Vec::new();
        for clause in &self.clauses {
            if clause.is_value_clause() {
                let name = clause.column();
                let nullable = batch
                    .column(name)
                    .ok_or_else(|| RowsieveError::ColumnNotFound(name.to_string()))?
                    .validity()
                    .is_some();
                if nullable && !screened.contains(&name) {
                    bound.push(BoundClause::NullTest {
                        validity: batch
                            .column(name)
                            .and_then(Column::validity)
                            .ok_or_else(|| RowsieveError::ColumnNotFound(name.to_string()))?,
                        keep_null: false,
                    });
                    screened.push(name);
                }
            }
            bound.push(clause.bind(batch)?);
        }
        Ok(BoundPipeline {
            clauses: bound,
            projection: self.projection.bind(batch)?,
            config: self.config,
            row_count: batch.row_count(),
        })
    }
}

/// Reusable working buffers for pipeline evaluation. Sized for one row
/// count; reuse across batches of the same size to keep the hot path
/// allocation-free.
#[derive(Debug)]
pub struct EvalScratch {
    mask: Vec<u8>,
    words: Vec<u64>,
    positions_a: Vec<u32>,
    positions_b: Vec<u32>,
}

impl EvalScratch {
    /// Allocates scratch for batches of `row_count` rows.
    #[must_use]
    pub fn new(row_count: usize) -> Self {
        Self {
            mask: vec![0; row_count],
            words: vec![0; row_count.div_ceil(64)],
            positions_a: vec![0; row_count],
            positions_b: vec![0; row_count],
        }
    }

    /// The row count this scratch was sized for.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.mask.len()
    }
}

/// A pipeline resolved against one batch, ready to evaluate.
#[derive(Debug)]
pub struct BoundPipeline<'a> {
    clauses: Vec<BoundClause<'a>>,
    projection: BoundProjection<'a>,
    config: PipelineConfig,
    row_count: usize,
}

impl BoundPipeline<'_> {
    /// Runs the filter clauses and writes `a * b` into `result` at each
    /// surviving ordinal, leaving other slots of `result` untouched.
    /// Returns the number of survivors.
    ///
    /// `initial` narrows the starting active set; `None` starts from all
    /// rows. Projection operands must be non-nullable; use
    /// [`evaluate_nullable`](Self::evaluate_nullable) otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `scratch` or `result` is sized for a different row count,
    /// or if a projection operand carries a validity array.
    pub fn evaluate(
        &self,
        initial: Option<&ActiveSet>,
        scratch: &mut EvalScratch,
        result: &mut [i64],
    ) -> usize {
        assert!(
            self.projection.a_validity.is_none() && self.projection.b_validity.is_none(),
            "nullable projection operands require evaluate_nullable"
        );
        assert_eq!(scratch.row_count(), self.row_count);
        assert_eq!(result.len(), self.row_count);
        match self.config.strategy {
            Strategy::DenseBytes => {
                let survivors = self.filter_dense(initial, &mut scratch.mask);
                project::product_dense(&scratch.mask, self.projection.a, self.projection.b, result);
                survivors
            }
            Strategy::Bitmap => {
                let survivors = self.filter_bitmap(initial, &mut scratch.words);
                project::product_bitmap(
                    &scratch.words,
                    self.row_count,
                    self.projection.a,
                    self.projection.b,
                    result,
                );
                survivors
            }
            Strategy::Selection => {
                let (positions, survivors) = self.filter_selection(initial, scratch);
                project::product_selection(positions, self.projection.a, self.projection.b, result);
                survivors
            }
        }
    }

    /// Like [`evaluate`](Self::evaluate) but null-propagating: for each
    /// surviving ordinal, `result_validity` is marked null when either
    /// operand is null and the product is skipped, otherwise the product is
    /// written and the slot marked non-null. Slots of non-surviving
    /// ordinals are untouched in both outputs.
    ///
    /// # Panics
    ///
    /// Panics if `scratch`, `result`, or `result_validity` is sized for a
    /// different row count.
    pub fn evaluate_nullable(
        &self,
        initial: Option<&ActiveSet>,
        scratch: &mut EvalScratch,
        result: &mut [i64],
        result_validity: &mut [u8],
    ) -> usize {
        assert_eq!(scratch.row_count(), self.row_count);
        assert_eq!(result.len(), self.row_count);
        assert_eq!(result_validity.len(), self.row_count);
        let p = self.projection;
        match self.config.strategy {
            Strategy::DenseBytes => {
                let survivors = self.filter_dense(initial, &mut scratch.mask);
                project::product_dense_nullable(
                    &scratch.mask,
                    p.a,
                    p.a_validity,
                    p.b,
                    p.b_validity,
                    result,
                    result_validity,
                );
                survivors
            }
            Strategy::Bitmap => {
                let survivors = self.filter_bitmap(initial, &mut scratch.words);
                project::product_bitmap_nullable(
                    &scratch.words,
                    self.row_count,
                    p.a,
                    p.a_validity,
                    p.b,
                    p.b_validity,
                    result,
                    result_validity,
                );
                survivors
            }
            Strategy::Selection => {
                let (positions, survivors) = self.filter_selection(initial, scratch);
                project::product_selection_nullable(
                    positions,
                    p.a,
                    p.a_validity,
                    p.b,
                    p.b_validity,
                    result,
                    result_validity,
                );
                survivors
            }
        }
    }

    fn filter_dense(&self, initial: Option<&ActiveSet>, mask: &mut [u8]) -> usize {
        match initial {
            Some(set) => set.write_byte_mask(mask),
            None => mask.fill(1),
        }
        for clause in &self.clauses {
            clause.narrow_mask(mask);
        }
        mask.iter().map(|&m| usize::from(m)).sum()
    }

    fn filter_bitmap(&self, initial: Option<&ActiveSet>, words: &mut [u64]) -> usize {
        match initial {
            Some(set) => set.write_bitmap(words, self.row_count),
            None => {
                words.fill(u64::MAX);
                let tail = self.row_count % 64;
                if tail != 0 {
                    if let Some(last) = words.last_mut() {
                        *last = (1u64 << tail) - 1;
                    }
                }
            }
        }
        for clause in &self.clauses {
            clause.narrow_bitmap(words, self.row_count);
        }
        bitmap::count(words)
    }

    /// Runs the clause chain over position lists and returns the surviving
    /// positions (a prefix of one of the scratch buffers).
    fn filter_selection<'s>(
        &self,
        initial: Option<&ActiveSet>,
        scratch: &'s mut EvalScratch,
    ) -> (&'s [u32], usize) {
        let mut count = match initial {
            Some(set) => set.write_selection(&mut scratch.positions_a),
            None => {
                for (i, p) in scratch.positions_a.iter_mut().enumerate() {
                    *p = i as u32;
                }
                self.row_count
            }
        };
        if self.config.sparse_in_place {
            for clause in &self.clauses {
                count =
                    clause.narrow_selection_in_place(&mut scratch.positions_a, count, self.config.compaction);
            }
            (&scratch.positions_a[..count], count)
        } else {
            let mut input = &mut scratch.positions_a;
            let mut output = &mut scratch.positions_b;
            for clause in &self.clauses {
                count = clause.narrow_selection_into(
                    &input[..count],
                    &mut output[..],
                    self.config.compaction,
                );
                mem::swap(&mut input, &mut output);
            }
            (&input[..count], count)
        }
    }

    /// Number of rows in the bound batch.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{BytesColumn, Int64Column, NULL};
    use crate::mask::SelectionVector;

    fn q6_batch() -> ColumnBatch {
        let mut batch = ColumnBatch::new();
        batch
            .add_column(
                "discount",
                Column::Int64(Int64Column::new(vec![4, 5, 6, 7, 8, 6])),
            )
            .unwrap();
        batch
            .add_column(
                "quantity",
                Column::Int64(Int64Column::new(vec![10, 30, 20, 23, 5, 24])),
            )
            .unwrap();
        batch
            .add_column(
                "extended_price",
                Column::Int64(Int64Column::new(vec![100, 200, 300, 400, 500, 600])),
            )
            .unwrap();
        batch
            .add_column(
                "ship_date",
                Column::Bytes(BytesColumn::from_strs(&[
                    "1994-03-01",
                    "1994-05-01",
                    "1993-12-31",
                    "1994-07-01",
                    "1994-09-01",
                    "1995-01-01",
                ])),
            )
            .unwrap();
        batch
    }

    fn q6_pipeline() -> Pipeline {
        Pipeline::new(Projection::product("extended_price", "discount"))
            .filter(FilterClause::gt_eq("discount", 5))
            .filter(FilterClause::lt_eq("discount", 7))
            .filter(FilterClause::lt("quantity", 24))
            .filter(FilterClause::bytes_gt_eq("ship_date", b"1994-01-01".to_vec()))
            .filter(FilterClause::bytes_lt("ship_date", b"1995-01-01".to_vec()))
    }

    fn evaluate_with(strategy: Strategy) -> (usize, Vec<i64>) {
        let batch = q6_batch();
        let pipeline =
            q6_pipeline().with_config(PipelineConfig::new().with_strategy(strategy));
        let bound = pipeline.bind(&batch).unwrap();
        let mut scratch = EvalScratch::new(batch.row_count());
        let mut result = vec![-1i64; batch.row_count()];
        let survivors = bound.evaluate(None, &mut scratch, &mut result);
        (survivors, result)
    }

    #[test]
    fn test_all_strategies_agree() {
        // Row 3 survives every clause: discount 7, quantity 23, 1994 date.
        for strategy in [Strategy::DenseBytes, Strategy::Bitmap, Strategy::Selection] {
            let (survivors, result) = evaluate_with(strategy);
            assert_eq!(survivors, 1, "{strategy:?}");
            assert_eq!(result[3], 400 * 7, "{strategy:?}");
            // Non-surviving slots keep the sentinel.
            assert_eq!(result[0], -1, "{strategy:?}");
        }
    }

    #[test]
    fn test_no_clauses_projects_everything() {
        let batch = q6_batch();
        let pipeline = Pipeline::new(Projection::product("extended_price", "discount"));
        let bound = pipeline.bind(&batch).unwrap();
        let mut scratch = EvalScratch::new(batch.row_count());
        let mut result = vec![0i64; batch.row_count()];
        let survivors = bound.evaluate(None, &mut scratch, &mut result);
        assert_eq!(survivors, 6);
        assert_eq!(result, vec![400, 1000, 1800, 2800, 4000, 3600]);
    }

    #[test]
    fn test_initial_active_set_narrows() {
        let batch = q6_batch();
        let pipeline = Pipeline::new(Projection::product("extended_price", "discount"))
            .filter(FilterClause::gt_eq("discount", 5));
        let bound = pipeline.bind(&batch).unwrap();
        let mut scratch = EvalScratch::new(batch.row_count());
        let mut result = vec![0i64; batch.row_count()];
        // Only rows 0 and 1 enter; row 0 fails the clause.
        let initial = ActiveSet::Selection(SelectionVector::from_positions(vec![0, 1]));
        let survivors = bound.evaluate(Some(&initial), &mut scratch, &mut result);
        assert_eq!(survivors, 1);
        assert_eq!(result[1], 1000);
        assert_eq!(result[3], 0);
    }

    #[test]
    fn test_double_buffered_selection_matches_in_place() {
        let batch = q6_batch();
        let base = q6_pipeline();
        let in_place = base
            .clone()
            .with_config(PipelineConfig::new().with_sparse_in_place(true))
            .bind(&batch)
            .unwrap();
        let buffered = base
            .with_config(PipelineConfig::new().with_sparse_in_place(false))
            .bind(&batch)
            .unwrap();
        let mut scratch = EvalScratch::new(batch.row_count());
        let mut a = vec![0i64; batch.row_count()];
        let mut b = vec![0i64; batch.row_count()];
        let na = in_place.evaluate(None, &mut scratch, &mut a);
        let nb = buffered.evaluate(None, &mut scratch, &mut b);
        assert_eq!(na, nb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_implicit_null_screen_on_value_clause() {
        let mut batch = ColumnBatch::new();
        batch
            .add_column(
                "discount",
                Column::Int64(
                    Int64Column::with_validity(vec![6, 6, 6], vec![0, NULL, 0]).unwrap(),
                ),
            )
            .unwrap();
        batch
            .add_column("price", Column::Int64(Int64Column::new(vec![10, 20, 30])))
            .unwrap();
        let pipeline = Pipeline::new(Projection::product("price", "price"))
            .filter(FilterClause::gt_eq("discount", 5));
        let bound = pipeline.bind(&batch).unwrap();
        let mut scratch = EvalScratch::new(3);
        let mut result = vec![0i64; 3];
        let survivors = bound.evaluate(None, &mut scratch, &mut result);
        // The null row is excluded even though its stored value matches.
        assert_eq!(survivors, 2);
        assert_eq!(result, vec![100, 0, 900]);
    }

    #[test]
    fn test_nullable_projection_propagates_nulls() {
        let mut batch = ColumnBatch::new();
        batch
            .add_column(
                "a",
                Column::Int64(
                    Int64Column::with_validity(vec![1, 2, 3], vec![0, NULL, 0]).unwrap(),
                ),
            )
            .unwrap();
        batch
            .add_column("b", Column::Int64(Int64Column::new(vec![10, 10, 10])))
            .unwrap();
        let pipeline = Pipeline::new(Projection::product("a", "b"));
        let bound = pipeline.bind(&batch).unwrap();
        let mut scratch = EvalScratch::new(3);
        let mut result = vec![0i64; 3];
        let mut validity = vec![9u8; 3];
        let survivors = bound.evaluate_nullable(None, &mut scratch, &mut result, &mut validity);
        assert_eq!(survivors, 3);
        assert_eq!(result, vec![10, 0, 30]);
        assert_eq!(validity, vec![0, NULL, 0]);
    }

    #[test]
    fn test_bound_pipeline_outlives_its_pipeline() {
        let batch = q6_batch();
        // The pipeline (holding the bytes literal) is dropped before
        // evaluation; the bound form must borrow the batch only.
        let bound = q6_pipeline().bind(&batch).unwrap();
        let mut scratch = EvalScratch::new(batch.row_count());
        let mut result = vec![0i64; batch.row_count()];
        let survivors = bound.evaluate(None, &mut scratch, &mut result);
        assert_eq!(survivors, 1);
        assert_eq!(result[3], 400 * 7);
    }

    #[test]
    fn test_bind_reports_unknown_projection_column() {
        let batch = q6_batch();
        let pipeline = Pipeline::new(Projection::product("extended_price", "missing"));
        assert!(matches!(
            pipeline.bind(&batch),
            Err(RowsieveError::ColumnNotFound(_))
        ));
    }
}
