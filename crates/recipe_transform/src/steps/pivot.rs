use hashbrown::HashSet;
use indexmap::IndexMap;
use recipe_table::column::infer_datatype;
use recipe_table::{Column, DataType, ScalarValue, Table};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{columns, require_non_empty, row_key};
use crate::errors::{Result, TransformError};

/// Reshape long rows into a wide table.
///
/// Produces one row per distinct `index` combination and one column per
/// distinct `columns` combination, both in order of first appearance. Cells
/// take the `values` entry of the first matching input row. Combinations with
/// no input row are null. Header names join the header values with `_`, and
/// two distinct header combinations that join to the same name are an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub values: String,
}

/// Header used for a null value in a pivoted column name.
const NULL_HEADER: &str = "null";

/// Column name for the header values of `row`, joined with `_`.
fn header_text(cols: &[&Column], row: usize) -> String {
    cols.iter()
        .map(|c| c.values()[row].to_text().unwrap_or_else(|| NULL_HEADER.to_string()))
        .collect::<Vec<_>>()
        .join("_")
}

impl Pivot {
    pub fn new<I, C>(
        index: impl IntoIterator<Item = I>,
        columns: impl IntoIterator<Item = C>,
        values: impl Into<String>,
    ) -> Self
    where
        I: Into<String>,
        C: Into<String>,
    {
        Pivot {
            index: index.into_iter().map(Into::into).collect(),
            columns: columns.into_iter().map(Into::into).collect(),
            values: values.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_empty(&self.index, "pivot index")?;
        require_non_empty(&self.columns, "pivot columns")?;
        for name in self.index.iter().chain(&self.columns) {
            if *name == self.values {
                return Err(TransformError::InvalidStep(format!(
                    "pivot values column '{name}' can't also be an index or header column"
                )));
            }
        }
        if let Some(name) = self.index.iter().find(|name| self.columns.contains(*name)) {
            return Err(TransformError::InvalidStep(format!(
                "pivot column '{name}' can't be both an index and a header column"
            )));
        }
        Ok(())
    }

    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        self.validate()?;
        let index_cols = columns(&table, &self.index)?;
        let header_cols = columns(&table, &self.columns)?;
        let values = table.column(&self.values)?;

        // Index key -> first input row. Output rows follow insertion order.
        let mut rows: IndexMap<_, usize> = IndexMap::new();
        // Header key -> (header text, cells by output row).
        let mut cells: IndexMap<_, (String, Vec<Option<usize>>)> = IndexMap::new();
        // Header text already claimed by a header key.
        let mut headers: HashSet<String> = HashSet::new();

        for row in 0..table.num_rows() {
            let out_row = match rows.entry(row_key(&index_cols, row)) {
                indexmap::map::Entry::Occupied(ent) => ent.index(),
                indexmap::map::Entry::Vacant(ent) => {
                    let out_row = ent.index();
                    ent.insert(row);
                    out_row
                }
            };

            let key = row_key(&header_cols, row);
            let (_, slots) = match cells.entry(key) {
                indexmap::map::Entry::Occupied(ent) => ent.into_mut(),
                indexmap::map::Entry::Vacant(ent) => {
                    let header = header_text(&header_cols, row);
                    if !headers.insert(header.clone()) {
                        return Err(TransformError::OutputCollision(header));
                    }
                    ent.insert((header, Vec::new()))
                }
            };
            if slots.len() <= out_row {
                slots.resize(out_row + 1, None);
            }
            // First value wins.
            if slots[out_row].is_none() {
                slots[out_row] = Some(row);
            }
        }

        let first_rows: Vec<usize> = rows.values().copied().collect();
        let num_out = first_rows.len();

        let mut out: Vec<Column> = index_cols.iter().map(|c| c.take(&first_rows)).collect();
        for (header, mut slots) in cells.into_values() {
            if self.index.contains(&header) {
                return Err(TransformError::OutputCollision(header));
            }
            slots.resize(num_out, None);
            let vals: Vec<ScalarValue> = slots
                .into_iter()
                .map(|slot| match slot {
                    Some(row) => values.values()[row].clone(),
                    None => ScalarValue::Null,
                })
                .collect();
            // Keep the source type unless the values column is loosely typed.
            let datatype = if values.datatype() == DataType::Any {
                infer_datatype(&vals)
            } else {
                values.datatype()
            };
            out.push(Column::try_new(header, datatype, vals)?);
        }

        trace!(rows = num_out, columns = out.len(), "pivoted table");

        Ok(Table::try_new(out)?)
    }
}
