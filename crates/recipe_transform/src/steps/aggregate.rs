use std::fmt;

use indexmap::IndexMap;
use recipe_table::{Column, DataType, ScalarValue, Table};
use serde::{Deserialize, Serialize};

use super::{columns, require_non_empty, row_key};
use crate::errors::{Result, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunc {
    /// Number of rows in the group, including rows where the column is null.
    Count,
    /// Sum of non-null values.
    Sum,
    /// Mean of non-null values.
    Mean,
}

impl AggregateFunc {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Mean => "mean",
        }
    }
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Group rows by key columns and aggregate a single column per group.
///
/// Output has one row per distinct key combination in order of first
/// appearance. Columns are the keys followed by the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub keys: Vec<String>,
    pub column: String,
    pub agg: AggregateFunc,
    /// Name of the aggregate column. Defaults to `<agg>_<column>`.
    #[serde(default)]
    pub output: Option<String>,
}

impl GroupAggregate {
    pub fn new<S: Into<String>>(
        keys: impl IntoIterator<Item = S>,
        column: impl Into<String>,
        agg: AggregateFunc,
    ) -> Self {
        GroupAggregate {
            keys: keys.into_iter().map(Into::into).collect(),
            column: column.into(),
            agg,
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn output_name(&self) -> String {
        match &self.output {
            Some(output) => output.clone(),
            None => format!("{}_{}", self.agg, self.column),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_empty(&self.keys, "group_aggregate keys")?;
        let output = self.output_name();
        if self.keys.contains(&output) {
            return Err(TransformError::OutputCollision(output));
        }
        Ok(())
    }

    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        self.validate()?;
        let keys = columns(&table, &self.keys)?;
        let source = table.column(&self.column)?;

        let datatype = source.datatype();
        if self.agg != AggregateFunc::Count
            && !(datatype.is_numeric() || datatype == DataType::Any)
        {
            return Err(TransformError::TypeMismatch {
                column: self.column.clone(),
                expected: "numeric",
                got: datatype,
            });
        }

        // Group key -> (first row, member rows).
        let mut groups: IndexMap<_, (usize, Vec<usize>)> = IndexMap::new();
        for row in 0..table.num_rows() {
            groups
                .entry(row_key(&keys, row))
                .or_insert_with(|| (row, Vec::new()))
                .1
                .push(row);
        }

        let first_rows: Vec<usize> = groups.values().map(|(first, _)| *first).collect();
        let mut out_columns: Vec<Column> = keys.iter().map(|c| c.take(&first_rows)).collect();

        let mut agg_values = Vec::with_capacity(groups.len());
        for (_, rows) in groups.values() {
            let values = rows.iter().map(|&row| &source.values()[row]);
            agg_values.push(match self.agg {
                AggregateFunc::Count => ScalarValue::Int64(rows.len() as i64),
                AggregateFunc::Sum => self.sum(values, datatype == DataType::Int64)?,
                AggregateFunc::Mean => self.mean(values)?,
            });
        }

        let agg_type = match self.agg {
            AggregateFunc::Count => DataType::Int64,
            AggregateFunc::Sum if datatype == DataType::Int64 => DataType::Int64,
            AggregateFunc::Sum | AggregateFunc::Mean => DataType::Float64,
        };
        out_columns.push(Column::try_new(self.output_name(), agg_type, agg_values)?);

        Ok(Table::try_new(out_columns)?)
    }

    fn numeric(&self, value: &ScalarValue) -> Result<Option<f64>> {
        match value {
            ScalarValue::Null => Ok(None),
            ScalarValue::Float64(v) if v.is_nan() => Ok(None),
            v => v.as_f64().map(Some).ok_or_else(|| TransformError::TypeMismatch {
                column: self.column.clone(),
                expected: "numeric",
                got: v.datatype().unwrap_or(DataType::Any),
            }),
        }
    }

    fn sum<'a>(
        &self,
        values: impl Iterator<Item = &'a ScalarValue>,
        integer: bool,
    ) -> Result<ScalarValue> {
        let values: Vec<&ScalarValue> = values.filter(|v| !v.is_null()).collect();
        if values.is_empty() {
            return Ok(ScalarValue::Null);
        }

        // Integer columns keep integer sums.
        if integer {
            let mut total: i64 = 0;
            for v in values {
                if let ScalarValue::Int64(v) = v {
                    total = total
                        .checked_add(*v)
                        .ok_or_else(|| TransformError::NumericOverflow(self.column.clone()))?;
                }
            }
            return Ok(ScalarValue::Int64(total));
        }

        let mut total = 0.0;
        let mut any = false;
        for v in values {
            if let Some(v) = self.numeric(v)? {
                total += v;
                any = true;
            }
        }
        Ok(if any {
            ScalarValue::Float64(total)
        } else {
            ScalarValue::Null
        })
    }

    fn mean<'a>(&self, values: impl Iterator<Item = &'a ScalarValue>) -> Result<ScalarValue> {
        let mut total = 0.0;
        let mut count = 0usize;
        for v in values {
            if let Some(v) = self.numeric(v)? {
                total += v;
                count += 1;
            }
        }
        Ok(if count == 0 {
            ScalarValue::Null
        } else {
            ScalarValue::Float64(total / count as f64)
        })
    }
}
