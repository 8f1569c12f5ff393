use recipe_table::{Column, DataType, ScalarValue, Table};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::check_output;
use crate::errors::{Result, TransformError};

/// Flag rows whose text column matches a pattern anywhere in the value.
///
/// Anchor the pattern with `^`/`$` to match the whole value. Null values
/// never match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexFlag {
    pub column: String,
    pub pattern: String,
    pub output: String,
    /// Write a boolean column instead of 0/1 integers.
    #[serde(default)]
    pub as_boolean: bool,
    #[serde(default)]
    pub overwrite: bool,
}

impl RegexFlag {
    pub fn new(
        column: impl Into<String>,
        pattern: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        RegexFlag {
            column: column.into(),
            pattern: pattern.into(),
            output: output.into(),
            as_boolean: false,
            overwrite: false,
        }
    }

    pub fn with_boolean_output(mut self, as_boolean: bool) -> Self {
        self.as_boolean = as_boolean;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn compile(&self) -> Result<Regex> {
        Ok(Regex::new(&self.pattern)?)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.compile()?;
        Ok(())
    }

    pub(crate) fn apply(&self, mut table: Table) -> Result<Table> {
        let regex = self.compile()?;
        let source = table.column(&self.column)?;
        check_output(&table, &self.output, self.overwrite)?;

        if !matches!(source.datatype(), DataType::Utf8 | DataType::Any) {
            return Err(self.type_mismatch(source.datatype()));
        }

        let values = source
            .values()
            .iter()
            .map(|value| {
                let matched = match value {
                    ScalarValue::Null => false,
                    ScalarValue::Utf8(s) => regex.is_match(s),
                    other => {
                        return Err(self.type_mismatch(other.datatype().unwrap_or(DataType::Any)));
                    }
                };
                Ok(if self.as_boolean {
                    ScalarValue::Boolean(matched)
                } else {
                    ScalarValue::Int64(matched as i64)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let datatype = if self.as_boolean {
            DataType::Boolean
        } else {
            DataType::Int64
        };
        table.set_column(Column::try_new(self.output.clone(), datatype, values)?)?;
        Ok(table)
    }

    fn type_mismatch(&self, got: DataType) -> TransformError {
        TransformError::TypeMismatch {
            column: self.column.clone(),
            expected: "text",
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use recipe_table::generate_table;

    use super::*;

    #[test]
    fn flag_ihd_diagnoses() {
        let table = generate_table!("MAIN_CONDITION" => ["I21", "J00", ScalarValue::Null]);
        let out = RegexFlag::new("MAIN_CONDITION", "^I2[0-5]", "IHD")
            .apply(table)
            .unwrap();
        assert_eq!(
            &[
                ScalarValue::Int64(1),
                ScalarValue::Int64(0),
                ScalarValue::Int64(0)
            ],
            out.column("IHD").unwrap().values()
        );
    }

    #[test]
    fn unanchored_search() {
        let table = generate_table!("c" => ["xxI21", "I99"]);
        let out = RegexFlag::new("c", "I2[0-5]", "f")
            .with_boolean_output(true)
            .apply(table)
            .unwrap();
        assert_eq!(
            &[ScalarValue::Boolean(true), ScalarValue::Boolean(false)],
            out.column("f").unwrap().values()
        );
        assert_eq!(DataType::Boolean, out.column("f").unwrap().datatype());
    }

    #[test]
    fn invalid_pattern() {
        let err = RegexFlag::new("c", "I2[0-5", "f").validate().unwrap_err();
        assert!(matches!(err, TransformError::InvalidPattern(_)));
    }

    #[test]
    fn non_text_column() {
        let table = generate_table!("c" => [21_i64]);
        let err = RegexFlag::new("c", "2", "f").apply(table).unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { .. }));
    }
}
