use hashbrown::HashSet;

use crate::column::Column;
use crate::errors::{Result, TableError};
use crate::scalar::ScalarValue;

/// A set of uniquely named, same-length columns.
///
/// Mutating methods take `&mut self` and check the shape and uniqueness
/// invariants before changing anything, so a failed call leaves the table
/// untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,

    /// Number of rows in this table. Tracked separately so that a table with
    /// no columns can still report zero rows consistently.
    num_rows: usize,
}

impl Table {
    pub const fn empty() -> Self {
        Table {
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    /// Create a new table from some number of columns.
    ///
    /// All columns must have the same length, and column names must be
    /// unique.
    pub fn try_new(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let columns: Vec<_> = columns.into_iter().collect();
        let num_rows = match columns.first() {
            Some(col) => col.len(),
            None => return Ok(Self::empty()),
        };

        {
            let mut seen = HashSet::with_capacity(columns.len());
            for col in &columns {
                if col.len() != num_rows {
                    return Err(TableError::ShapeMismatch {
                        column: col.name().to_string(),
                        expected: num_rows,
                        got: col.len(),
                    });
                }
                if !seen.insert(col.name()) {
                    return Err(TableError::DuplicateColumn(col.name().to_string()));
                }
            }
        }

        Ok(Table { columns, num_rows })
    }

    /// Create a table from (name, values) pairs, inferring each column's type.
    pub fn try_from_pairs<N, I>(pairs: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<ScalarValue>)>,
    {
        Self::try_new(
            pairs
                .into_iter()
                .map(|(name, values)| Column::infer(name, values)),
        )
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// Append a new column to the end of the table.
    ///
    /// Errors if a column with the same name already exists.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(column.name()) {
            return Err(TableError::DuplicateColumn(column.name().to_string()));
        }
        self.check_len(&column)?;
        if self.columns.is_empty() {
            self.num_rows = column.len();
        }
        self.columns.push(column);
        Ok(())
    }

    /// Add a column, replacing any existing column with the same name.
    ///
    /// A replaced column keeps its position.
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        match self.column_index(column.name()) {
            Some(idx) => {
                self.check_len(&column)?;
                self.columns[idx] = column;
                Ok(())
            }
            None => self.push_column(column),
        }
    }

    /// Get the values for a single row.
    pub fn row(&self, idx: usize) -> Result<Vec<&ScalarValue>> {
        if idx >= self.num_rows {
            return Err(TableError::RowOutOfBounds {
                row: idx,
                num_rows: self.num_rows,
            });
        }
        Ok(self.columns.iter().map(|c| &c.values()[idx]).collect())
    }

    /// Build a new table containing only the rows at the given indices, in
    /// the given order.
    ///
    /// Indices must be in bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            num_rows: indices.len(),
        }
    }

    /// Build a new table with only the named columns, in the given order.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Ok(Table::empty());
        }
        Table::try_new(columns)
    }

    fn check_len(&self, column: &Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.num_rows {
            return Err(TableError::ShapeMismatch {
                column: column.name().to_string(),
                expected: self.num_rows,
                got: column.len(),
            });
        }
        Ok(())
    }
}
