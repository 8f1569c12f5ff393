use recipe_table::{DataType, ScalarValue};

use crate::errors::Result;

/// Column metadata reported by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared type, if the driver reports one we understand.
    pub datatype: Option<DataType>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, datatype: Option<DataType>) -> Self {
        ColumnMeta {
            name: name.into(),
            datatype,
        }
    }
}

/// Raw result of a single statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    /// Row-major values, each row having one value per column.
    pub rows: Vec<Vec<ScalarValue>>,
}

/// A handle to an external database.
///
/// The handle is owned by the caller. Executing a query borrows it for the
/// duration of the call, and never closes it.
pub trait Connection {
    /// Returns if the connection can accept statements.
    fn is_open(&self) -> bool;

    /// Driver syntax for a positional parameter, `position` starting at 1.
    fn placeholder(&self, position: usize) -> String {
        format!("?{position}")
    }

    /// Execute a single statement with positional parameters, returning all
    /// rows.
    ///
    /// Driver failures should be reported as
    /// [`QueryError::ExecutionError`](crate::QueryError::ExecutionError) with
    /// the driver's message.
    fn query(&mut self, sql: &str, params: &[ScalarValue]) -> Result<QueryResult>;
}
