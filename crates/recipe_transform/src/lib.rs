//! Transform pipelines over result tables.
//!
//! A [`Pipeline`] is an ordered list of [`Step`]s. Steps are a closed set of
//! kinds, each with its own parameters. Parameters that can be checked without
//! data (bucket boundaries, regex patterns, key lists) are checked when the
//! pipeline is built. Steps then run strictly in order, each consuming the
//! table produced by the previous step. The first failing step aborts the
//! pipeline.
pub mod errors;
pub mod pipeline;
pub mod step;
pub mod steps;

pub use errors::{PipelineError, Result, TransformError};
pub use pipeline::{Pipeline, apply};
pub use step::{Step, StepKind};
pub use steps::aggregate::{AggregateFunc, GroupAggregate};
pub use steps::bucket::{BucketNumeric, Overflow};
pub use steps::date_part::{DatePart, DeriveDatePart};
pub use steps::dedupe::DedupeByKeys;
pub use steps::filter::{CompareOp, FilterRows, Predicate};
pub use steps::lookup::MapLookup;
pub use steps::pivot::Pivot;
pub use steps::regex_flag::RegexFlag;
pub use steps::select::SelectColumns;
pub use steps::sort::{SortKey, SortRows};
