//! Run recipes: a SQL query, a transform pipeline over its result, and a CSV
//! export.
pub mod config;
pub mod errors;
pub mod run;

pub use config::{OutputConfig, QuerySource, Recipe, parse_param};
pub use errors::{RecipeError, Result};
pub use run::{RunOptions, run};
