use std::path::PathBuf;

use recipe_csv::CsvExportError;
use recipe_query::QueryError;
use recipe_transform::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("Failed to read recipe '{}': {source}", path.display())]
    ReadRecipe {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse recipe '{}': {source}", path.display())]
    ParseRecipe {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid parameter '{0}', expected NAME=VALUE")]
    InvalidParam(String),

    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Csv(#[from] CsvExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = RecipeError> = std::result::Result<T, E>;
