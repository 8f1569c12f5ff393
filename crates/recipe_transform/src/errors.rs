use recipe_table::{DataType, TableError};

use crate::step::StepKind;

/// Reason a single step failed.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid bucket spec: {0}")]
    InvalidBucketSpec(String),

    #[error(
        "Failed to parse '{value}' in column '{column}' at row {row} as a date using format '{format}'"
    )]
    DateParseError {
        column: String,
        row: usize,
        value: String,
        format: String,
    },

    #[error("Column '{column}' has type {got}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        got: DataType,
    },

    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Output column '{0}' already exists, set 'overwrite' to replace it")]
    OutputCollision(String),

    #[error("Integer overflow computing sum of column '{0}'")]
    NumericOverflow(String),

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// A step failure tagged with where in the pipeline it happened.
#[derive(Debug, thiserror::Error)]
#[error("Step {position} ({kind}) failed: {source}")]
pub struct PipelineError {
    /// 1-based position of the failing step.
    pub position: usize,
    pub kind: StepKind,
    pub source: TransformError,
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
