//! Per-kind step implementations.
pub mod aggregate;
pub mod bucket;
pub mod date_part;
pub mod dedupe;
pub mod filter;
pub mod lookup;
pub mod pivot;
pub mod regex_flag;
pub mod select;
pub mod sort;

use recipe_table::{Column, GroupKey, Table};

use crate::errors::{Result, TransformError};

/// Errors if `output` names an existing column and `overwrite` isn't set.
pub(crate) fn check_output(table: &Table, output: &str, overwrite: bool) -> Result<()> {
    if !overwrite && table.has_column(output) {
        return Err(TransformError::OutputCollision(output.to_string()));
    }
    Ok(())
}

/// Look up several columns by name.
pub(crate) fn columns<'a>(table: &'a Table, names: &[String]) -> Result<Vec<&'a Column>> {
    names
        .iter()
        .map(|name| Ok(table.column(name)?))
        .collect()
}

/// Hashable key for a row made from the given columns.
pub(crate) fn row_key(cols: &[&Column], row: usize) -> Vec<GroupKey> {
    cols.iter().map(|c| c.values()[row].group_key()).collect()
}

/// Errors if a list of column names is empty.
pub(crate) fn require_non_empty(names: &[String], what: &str) -> Result<()> {
    if names.is_empty() {
        return Err(TransformError::InvalidStep(format!(
            "{what} must name at least one column"
        )));
    }
    Ok(())
}
