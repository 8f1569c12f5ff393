use recipe_table::Table;
use tracing::{debug, trace};

use crate::errors::PipelineError;
use crate::step::Step;

/// An ordered, validated list of transform steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Create a pipeline, validating each step's parameters.
    ///
    /// Errors on the first invalid step.
    pub fn try_new(steps: impl IntoIterator<Item = Step>) -> Result<Self, PipelineError> {
        let steps: Vec<Step> = steps.into_iter().collect();
        for (idx, step) in steps.iter().enumerate() {
            step.validate().map_err(|source| PipelineError {
                position: idx + 1,
                kind: step.kind(),
                source,
            })?;
        }
        Ok(Pipeline { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order.
    ///
    /// Stops at the first failing step. The input table is consumed either
    /// way.
    pub fn apply(&self, table: Table) -> Result<Table, PipelineError> {
        let mut table = table;
        for (idx, step) in self.steps.iter().enumerate() {
            let position = idx + 1;
            let rows_in = table.num_rows();
            trace!(position, kind = %step.kind(), rows = rows_in, "applying step");

            table = step.apply(table).map_err(|source| PipelineError {
                position,
                kind: step.kind(),
                source,
            })?;

            debug!(
                position,
                kind = %step.kind(),
                rows_in,
                rows_out = table.num_rows(),
                columns = table.num_columns(),
                "applied step"
            );
        }
        Ok(table)
    }
}

/// Validate and apply a list of steps to a table.
pub fn apply(table: Table, steps: &[Step]) -> Result<Table, PipelineError> {
    Pipeline::try_new(steps.iter().cloned())?.apply(table)
}
