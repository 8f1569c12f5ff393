#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("Invalid CSV dialect: {0}")]
    InvalidDialect(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CsvExportError> = std::result::Result<T, E>;
