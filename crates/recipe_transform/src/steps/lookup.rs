use indexmap::IndexMap;
use recipe_table::{Column, DataType, ScalarValue, Table};
use serde::{Deserialize, Serialize};

use super::check_output;
use crate::errors::Result;

/// Replace coded values with labels from a mapping.
///
/// Values are looked up by their text form, so integer codes can be mapped
/// with string keys. Null and unmapped values become `default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLookup {
    pub column: String,
    pub mapping: IndexMap<String, String>,
    pub default: String,
    /// Column to write to. Replaces the source column when unset.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

impl MapLookup {
    pub fn new<K, V>(
        column: impl Into<String>,
        mapping: impl IntoIterator<Item = (K, V)>,
        default: impl Into<String>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        MapLookup {
            column: column.into(),
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default: default.into(),
            output: None,
            overwrite: false,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn lookup(&self, value: &ScalarValue) -> &str {
        value
            .to_text()
            .and_then(|key| self.mapping.get(&key))
            .unwrap_or(&self.default)
    }

    pub(crate) fn apply(&self, mut table: Table) -> Result<Table> {
        let source = table.column(&self.column)?;
        let output = match &self.output {
            Some(output) => {
                check_output(&table, output, self.overwrite)?;
                output.as_str()
            }
            None => self.column.as_str(),
        };

        let values = source
            .values()
            .iter()
            .map(|v| ScalarValue::Utf8(self.lookup(v).to_string()))
            .collect();

        table.set_column(Column::try_new(output, DataType::Utf8, values)?)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use recipe_table::generate_table;
    use recipe_table::testutil::assert_tables_eq;

    use super::*;

    fn health_boards() -> MapLookup {
        MapLookup::new("HBRES", [("S08000019", "NHS Forth Valley")], "Other")
    }

    #[test]
    fn replace_in_place() {
        let table = generate_table!(
            "LINK_NO" => [1_i64, 2_i64, 3_i64],
            "HBRES" => ["S08000019", "S08000099", ScalarValue::Null],
        );
        let out = health_boards().apply(table).unwrap();

        let expected = generate_table!(
            "LINK_NO" => [1_i64, 2_i64, 3_i64],
            "HBRES" => ["NHS Forth Valley", "Other", "Other"],
        );
        assert_tables_eq(&expected, &out);
    }

    #[test]
    fn separate_output() {
        let table = generate_table!("HBRES" => ["S08000019"]);
        let out = health_boards()
            .with_output("HB_NAME")
            .apply(table)
            .unwrap();
        assert_eq!(vec!["HBRES", "HB_NAME"], out.column_names());
        assert_eq!(
            &[ScalarValue::from("S08000019")],
            out.column("HBRES").unwrap().values()
        );
        assert_eq!(
            &[ScalarValue::from("NHS Forth Valley")],
            out.column("HB_NAME").unwrap().values()
        );
    }

    #[test]
    fn integer_codes_match_text_keys() {
        let table = generate_table!("SEX" => [1_i64, 2_i64, 9_i64]);
        let out = MapLookup::new("SEX", [("1", "Male"), ("2", "Female")], "Unknown")
            .apply(table)
            .unwrap();
        assert_eq!(
            &[
                ScalarValue::from("Male"),
                ScalarValue::from("Female"),
                ScalarValue::from("Unknown")
            ],
            out.column("SEX").unwrap().values()
        );
        assert_eq!(DataType::Utf8, out.column("SEX").unwrap().datatype());
    }

    #[test]
    fn output_collision() {
        let table = generate_table!("HBRES" => ["S08000019"], "HB_NAME" => ["x"]);
        let err = health_boards()
            .with_output("HB_NAME")
            .apply(table)
            .unwrap_err();
        assert!(matches!(err, crate::TransformError::OutputCollision(_)));
    }

    #[test]
    fn missing_column() {
        let table = generate_table!("a" => [1_i64]);
        let err = health_boards().apply(table).unwrap_err();
        assert!(matches!(
            err,
            crate::TransformError::Table(recipe_table::TableError::UnknownColumn(_))
        ));
    }
}
