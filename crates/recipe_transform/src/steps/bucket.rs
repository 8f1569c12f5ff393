use recipe_table::{Column, DataType, ScalarValue, Table};
use serde::{Deserialize, Serialize};

use super::check_output;
use crate::errors::{Result, TransformError};

/// What to do with values above the highest boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Produce null.
    #[default]
    Null,
    /// Assign the last label.
    LastBucket,
}

/// Map a numeric column onto labeled intervals.
///
/// Interval `i` covers `(boundaries[i], boundaries[i + 1]]`, except the first
/// interval which also includes its lower boundary. So boundaries `[0, 4, 9]`
/// put 0 through 4 in the first bucket and anything above 4 up to 9 in the
/// second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketNumeric {
    pub column: String,
    pub output: String,
    pub boundaries: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub overflow: Overflow,
    #[serde(default)]
    pub overwrite: bool,
}

impl BucketNumeric {
    pub fn new<L>(
        column: impl Into<String>,
        output: impl Into<String>,
        boundaries: impl IntoIterator<Item = f64>,
        labels: impl IntoIterator<Item = L>,
    ) -> Self
    where
        L: Into<String>,
    {
        BucketNumeric {
            column: column.into(),
            output: output.into(),
            boundaries: boundaries.into_iter().collect(),
            labels: labels.into_iter().map(Into::into).collect(),
            overflow: Overflow::default(),
            overwrite: false,
        }
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.boundaries.len() < 2 {
            return Err(TransformError::InvalidBucketSpec(format!(
                "need at least 2 boundaries, got {}",
                self.boundaries.len()
            )));
        }
        if let Some(b) = self.boundaries.iter().find(|b| !b.is_finite()) {
            return Err(TransformError::InvalidBucketSpec(format!(
                "boundary {b} is not finite"
            )));
        }
        if let Some(w) = self.boundaries.windows(2).find(|w| w[0] >= w[1]) {
            return Err(TransformError::InvalidBucketSpec(format!(
                "boundaries must be strictly increasing, got {} then {}",
                w[0], w[1]
            )));
        }
        if self.labels.len() != self.boundaries.len() - 1 {
            return Err(TransformError::InvalidBucketSpec(format!(
                "expected {} labels for {} boundaries, got {}",
                self.boundaries.len() - 1,
                self.boundaries.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    /// Index of the label for a value, if any.
    fn bucket_index(&self, v: f64) -> Option<usize> {
        if v.is_nan() {
            return None;
        }
        let lowest = self.boundaries[0];
        let highest = self.boundaries[self.boundaries.len() - 1];
        if v < lowest {
            return None;
        }
        if v > highest {
            return match self.overflow {
                Overflow::Null => None,
                Overflow::LastBucket => Some(self.labels.len() - 1),
            };
        }
        // First upper boundary that is >= v. Intervals are closed on the right.
        let upper = self.boundaries[1..].partition_point(|b| *b < v);
        Some(upper.min(self.labels.len() - 1))
    }

    pub(crate) fn apply(&self, mut table: Table) -> Result<Table> {
        self.validate()?;
        let source = table.column(&self.column)?;
        check_output(&table, &self.output, self.overwrite)?;

        if !(source.datatype().is_numeric() || source.datatype() == DataType::Any) {
            return Err(self.type_mismatch(source.datatype()));
        }

        let values = source
            .values()
            .iter()
            .map(|value| {
                if value.is_null() {
                    return Ok(ScalarValue::Null);
                }
                let v = value
                    .as_f64()
                    .ok_or_else(|| self.type_mismatch(value.datatype().unwrap_or(DataType::Any)))?;
                Ok(match self.bucket_index(v) {
                    Some(idx) => ScalarValue::Utf8(self.labels[idx].clone()),
                    None => ScalarValue::Null,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        table.set_column(Column::try_new(self.output.clone(), DataType::Utf8, values)?)?;
        Ok(table)
    }

    fn type_mismatch(&self, got: DataType) -> TransformError {
        TransformError::TypeMismatch {
            column: self.column.clone(),
            expected: "numeric",
            got,
        }
    }
}
