use std::collections::HashMap;
use std::path::{Path, PathBuf};

use recipe_csv::DialectOptions;
use recipe_query::{QuerySpec, SqlTemplate};
use recipe_table::ScalarValue;
use recipe_transform::Step;
use serde::{Deserialize, Serialize};

use crate::errors::{RecipeError, Result};

/// Where a recipe's SQL comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySource {
    /// Inline SQL text.
    Sql(String),
    /// Path to a SQL file, relative to the recipe file.
    SqlFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_quote")]
    pub quote: char,
    #[serde(default = "default_header")]
    pub header: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

fn default_header() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: None,
            delimiter: default_delimiter(),
            quote: default_quote(),
            header: default_header(),
        }
    }
}

impl OutputConfig {
    pub fn dialect(&self) -> Result<DialectOptions> {
        Ok(DialectOptions::try_from_chars(self.delimiter, self.quote)?)
    }
}

/// A query, its parameters, the steps to run over the result and where to
/// write it.
///
/// ```json
/// {
///   "query": {"sql_file": "admissions.sql"},
///   "params": {"start": "2019-04-01", "end": "2020-03-31"},
///   "steps": [
///     {"kind": "derive_date_part", "column": "ADMISSION_DATE", "output": "YEAR", "part": "year"},
///     {"kind": "dedupe_by_keys", "keys": ["LINK_NO", "YEAR"]}
///   ],
///   "output": {"path": "admissions.csv"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    pub query: QuerySource,
    #[serde(default)]
    pub params: HashMap<String, ScalarValue>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub output: OutputConfig,

    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Recipe {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RecipeError::ReadRecipe {
            path: path.to_path_buf(),
            source,
        })?;
        let mut recipe: Recipe =
            serde_json::from_str(&content).map_err(|source| RecipeError::ParseRecipe {
                path: path.to_path_buf(),
                source,
            })?;
        recipe.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(recipe)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Load the SQL template and bind this recipe's parameters.
    pub fn query_spec(&self) -> Result<QuerySpec> {
        let template = match &self.query {
            QuerySource::Sql(sql) => SqlTemplate::new(sql.clone()),
            QuerySource::SqlFile(path) => SqlTemplate::from_file(self.resolve(path))?,
        };
        let mut spec = QuerySpec::new(template);
        for (name, value) in &self.params {
            spec.bind(name.clone(), value.clone());
        }
        Ok(spec)
    }
}

/// Parse a `NAME=VALUE` parameter override.
///
/// Values are read as JSON literals where possible, so `year=2019` binds an
/// integer and `start=2019-04-01` binds a date. Anything else binds as text.
pub fn parse_param(arg: &str) -> Result<(String, ScalarValue)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| RecipeError::InvalidParam(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(RecipeError::InvalidParam(arg.to_string()));
    }

    let value = match serde_json::from_str::<ScalarValue>(value) {
        Ok(v) => v,
        Err(_) => serde_json::from_value(serde_json::Value::String(value.to_string()))
            .unwrap_or_else(|_| ScalarValue::Utf8(value.to_string())),
    };

    Ok((name.to_string(), value))
}
