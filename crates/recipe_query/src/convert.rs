use chrono::{NaiveDate, NaiveDateTime};
use recipe_table::{Column, DataType, ScalarValue, Table};

use crate::connection::{ColumnMeta, QueryResult};
use crate::errors::{QueryError, Result};

/// Converts raw driver output into a table.
///
/// Columns with a declared type have every value converted to that type.
/// Columns without one have their type inferred from the values.
#[derive(Debug, Clone)]
pub struct Converter {
    columns: Vec<ColumnMeta>,
}

impl Converter {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Converter { columns }
    }

    pub fn create_table(&self, rows: Vec<Vec<ScalarValue>>) -> Result<Table> {
        let num_rows = rows.len();
        let mut values: Vec<Vec<ScalarValue>> = self
            .columns
            .iter()
            .map(|_| Vec::with_capacity(num_rows))
            .collect();

        for row in rows {
            if row.len() != self.columns.len() {
                return Err(QueryError::ExecutionError {
                    message: format!(
                        "Driver returned row with {} values, expected {}",
                        row.len(),
                        self.columns.len()
                    ),
                });
            }
            for (col_idx, value) in row.into_iter().enumerate() {
                values[col_idx].push(value);
            }
        }

        let mut cols = Vec::with_capacity(self.columns.len());
        for (meta, values) in self.columns.iter().zip(values) {
            let col = match meta.datatype {
                Some(datatype) => {
                    let values = values
                        .into_iter()
                        .map(|v| convert_value(&meta.name, datatype, v))
                        .collect::<Result<Vec<_>>>()?;
                    Column::try_new(meta.name.clone(), datatype, values)?
                }
                None => Column::infer(meta.name.clone(), values),
            };
            cols.push(col);
        }

        Ok(Table::try_new(cols)?)
    }
}

impl QueryResult {
    /// Materialize this result into a table using the declared column types.
    pub fn into_table(self) -> Result<Table> {
        Converter::new(self.columns).create_table(self.rows)
    }
}

fn conversion_err(column: &str, datatype: DataType, value: &ScalarValue) -> QueryError {
    QueryError::Conversion {
        column: column.to_string(),
        datatype,
        value: value.to_string(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // Datetimes stored in a date column keep their date part.
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(datetime.date());
        }
    }
    None
}

/// Convert a single value to the given type.
pub fn convert_value(column: &str, datatype: DataType, value: ScalarValue) -> Result<ScalarValue> {
    Ok(match (datatype, value) {
        (_, ScalarValue::Null) => ScalarValue::Null,
        (DataType::Any, v) => v,

        (DataType::Boolean, v @ ScalarValue::Boolean(_)) => v,
        (DataType::Boolean, ScalarValue::Int64(i)) => ScalarValue::Boolean(i != 0),
        (DataType::Boolean, ScalarValue::Utf8(s)) => {
            if s.eq_ignore_ascii_case("t") || s.eq_ignore_ascii_case("true") || s == "1" {
                ScalarValue::Boolean(true)
            } else if s.eq_ignore_ascii_case("f") || s.eq_ignore_ascii_case("false") || s == "0"
            {
                ScalarValue::Boolean(false)
            } else if s.is_empty() || s.eq_ignore_ascii_case("null") {
                ScalarValue::Null
            } else {
                return Err(conversion_err(column, datatype, &ScalarValue::Utf8(s)));
            }
        }

        (DataType::Int64, v @ ScalarValue::Int64(_)) => v,
        (DataType::Int64, ScalarValue::Boolean(b)) => ScalarValue::Int64(b as i64),
        (DataType::Int64, ScalarValue::Float64(f)) => {
            if f.trunc() == f && f.is_finite() {
                ScalarValue::Int64(f as i64)
            } else {
                return Err(conversion_err(column, datatype, &ScalarValue::Float64(f)));
            }
        }
        (DataType::Int64, ScalarValue::Utf8(s)) => {
            if s.is_empty() || s.eq_ignore_ascii_case("null") {
                ScalarValue::Null
            } else {
                match s.trim().parse::<i64>() {
                    Ok(i) => ScalarValue::Int64(i),
                    Err(_) => return Err(conversion_err(column, datatype, &ScalarValue::Utf8(s))),
                }
            }
        }

        (DataType::Float64, v @ ScalarValue::Float64(_)) => v,
        (DataType::Float64, ScalarValue::Int64(i)) => ScalarValue::Float64(i as f64),
        (DataType::Float64, ScalarValue::Utf8(s)) => {
            if s.is_empty() || s.eq_ignore_ascii_case("null") {
                ScalarValue::Null
            } else {
                match s.trim().parse::<f64>() {
                    Ok(f) => ScalarValue::Float64(f),
                    Err(_) => return Err(conversion_err(column, datatype, &ScalarValue::Utf8(s))),
                }
            }
        }

        (DataType::Date, v @ ScalarValue::Date(_)) => v,
        (DataType::Date, ScalarValue::Utf8(s)) => match parse_date(s.trim()) {
            Some(date) => ScalarValue::Date(date),
            None if s.is_empty() => ScalarValue::Null,
            None => return Err(conversion_err(column, datatype, &ScalarValue::Utf8(s))),
        },

        // Text affinity accepts anything.
        (DataType::Utf8, v @ ScalarValue::Utf8(_)) => v,
        (DataType::Utf8, v) => ScalarValue::Utf8(v.to_string()),

        (datatype, v) => return Err(conversion_err(column, datatype, &v)),
    })
}
