//! Filter-then-project pipelines: clause descriptors, bind-once resolution,
//! and the evaluation driver.

mod clause;
mod driver;

pub use clause::FilterClause;
pub use driver::{BoundPipeline, EvalScratch, Pipeline, PipelineConfig, Projection, Strategy};
