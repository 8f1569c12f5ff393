use std::collections::HashMap;

use recipe_table::ScalarValue;

use crate::errors::Result;
use crate::template::{BoundQuery, SqlTemplate};

/// A SQL template plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    template: SqlTemplate,
    params: HashMap<String, ScalarValue>,
}

impl QuerySpec {
    pub fn new(template: SqlTemplate) -> Self {
        QuerySpec {
            template,
            params: HashMap::new(),
        }
    }

    /// Shorthand for a spec built from raw SQL text.
    pub fn from_sql(sql: impl Into<String>) -> Self {
        Self::new(SqlTemplate::new(sql))
    }

    /// Bind a value to a placeholder, replacing any earlier value.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<ScalarValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn template(&self) -> &SqlTemplate {
        &self.template
    }

    pub fn params(&self) -> &HashMap<String, ScalarValue> {
        &self.params
    }

    /// Rewrite this spec into positional form using the given placeholder
    /// syntax.
    pub fn to_bound<F>(&self, placeholder: F) -> Result<BoundQuery>
    where
        F: Fn(usize) -> String,
    {
        self.template.bind(&self.params, placeholder)
    }
}
