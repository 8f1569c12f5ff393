use crate::datatype::DataType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Expected column '{column}' to have {expected} rows, got {got}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}' expected value of type {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        got: DataType,
    },

    #[error("Row {row} out of bounds for table with {num_rows} rows")]
    RowOutOfBounds { row: usize, num_rows: usize },
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;
