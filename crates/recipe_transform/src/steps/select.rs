use hashbrown::HashSet;
use recipe_table::Table;
use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::errors::{Result, TransformError};

/// Keep only the named columns, in the given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectColumns {
    pub columns: Vec<String>,
}

impl SelectColumns {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        SelectColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_empty(&self.columns, "select_columns columns")?;
        let mut seen = HashSet::new();
        for name in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(TransformError::InvalidStep(format!(
                    "column '{name}' selected more than once"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        self.validate()?;
        Ok(table.project(&self.columns)?)
    }
}
