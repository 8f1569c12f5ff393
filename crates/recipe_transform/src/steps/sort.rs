use std::cmp::Ordering;

use recipe_table::{ScalarValue, Table};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TransformError};

/// A column to sort by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
    /// Place nulls before other values. Nulls go last by default regardless
    /// of direction.
    #[serde(default)]
    pub nulls_first: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            descending: false,
            nulls_first: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            descending: true,
            nulls_first: false,
        }
    }

    pub fn with_nulls_first(mut self, nulls_first: bool) -> Self {
        self.nulls_first = nulls_first;
        self
    }

    fn compare(&self, a: &ScalarValue, b: &ScalarValue) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if self.nulls_first => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if self.nulls_first => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.sort_cmp(b);
                if self.descending { ord.reverse() } else { ord }
            }
        }
    }
}

/// Stable sort of rows by one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRows {
    pub by: Vec<SortKey>,
}

impl SortRows {
    pub fn new(by: impl IntoIterator<Item = SortKey>) -> Self {
        SortRows {
            by: by.into_iter().collect(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.by.is_empty() {
            return Err(TransformError::InvalidStep(
                "sort_rows must name at least one column".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        self.validate()?;
        let keys = self
            .by
            .iter()
            .map(|key| Ok((key, table.column(&key.column)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut indices: Vec<usize> = (0..table.num_rows()).collect();
        indices.sort_by(|&a, &b| {
            keys.iter()
                .map(|(key, col)| key.compare(&col.values()[a], &col.values()[b]))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(table.take_rows(&indices))
    }
}
