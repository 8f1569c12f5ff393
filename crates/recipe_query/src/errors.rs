use recipe_table::{DataType, TableError};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Unbound placeholders in query: {}", .missing.join(", "))]
    BindingError { missing: Vec<String> },

    #[error("Failed to execute query: {message}")]
    ExecutionError { message: String },

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Unable to convert value for column '{column}' to {datatype}: {value}")]
    Conversion {
        column: String,
        datatype: DataType,
        value: String,
    },

    #[error("Unsupported value type for column '{column}': {typ}")]
    UnsupportedType { column: String, typ: String },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        QueryError::ExecutionError {
            message: value.to_string(),
        }
    }
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;
