//! rowsieve - columnar filter-then-project execution kernel.
//!
//! Evaluates a conjunction of range and null predicates over a columnar batch
//! and computes an arithmetic projection for the rows that survive, preserving
//! their original relative order. The set of rows still under consideration
//! (the *active set*) can be carried in four interchangeable encodings: a
//! dense boolean mask, a dense byte mask, a packed 64-bit bitmap, or a sparse
//! position list.
//!
//! Filter clauses are bound to concrete column slices once per batch, so the
//! per-row loops run without dynamic dispatch or type checks. Scratch buffers
//! are caller-owned and reusable across calls; the evaluation path performs no
//! allocation.
//!
//! ```
//! use rowsieve::{
//!     Column, ColumnBatch, EvalScratch, FilterClause, Int64Column, Pipeline, Projection,
//! };
//!
//! let mut batch = ColumnBatch::new();
//! batch
//!     .add_column("discount", Column::Int64(Int64Column::new(vec![4, 5, 6, 7, 8])))
//!     .unwrap();
//! batch
//!     .add_column("price", Column::Int64(Int64Column::new(vec![10, 20, 30, 40, 50])))
//!     .unwrap();
//!
//! let pipeline = Pipeline::new(Projection::product("discount", "price"))
//!     .filter(FilterClause::gt_eq("discount", 5))
//!     .filter(FilterClause::lt_eq("discount", 7));
//!
//! let bound = pipeline.bind(&batch).unwrap();
//! let mut scratch = EvalScratch::new(batch.row_count());
//! let mut result = vec![0i64; batch.row_count()];
//!
//! let survivors = bound.evaluate(None, &mut scratch, &mut result);
//! assert_eq!(survivors, 3);
//! assert_eq!(&result[1..4], &[100, 180, 280]);
//! ```

pub mod column;
pub mod error;
pub mod ingest;
pub mod kernel;
pub mod mask;
pub mod pipeline;

pub use column::{BytesColumn, Column, ColumnBatch, Int64Column};
pub use error::{Result, RowsieveError};
pub use kernel::{CmpOp, CompactionMode};
pub use mask::{ActiveSet, BitmapMask, ByteMask, DenseMask, SelectionVector};
pub use pipeline::{
    BoundPipeline, EvalScratch, FilterClause, Pipeline, PipelineConfig, Projection, Strategy,
};
