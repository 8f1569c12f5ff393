use hashbrown::HashSet;
use recipe_table::Table;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{columns, require_non_empty, row_key};
use crate::errors::Result;

/// Keep the first row for each distinct combination of key values.
///
/// Null keys compare equal to each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupeByKeys {
    pub keys: Vec<String>,
}

impl DedupeByKeys {
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        DedupeByKeys {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_empty(&self.keys, "dedupe_by_keys keys")
    }

    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        self.validate()?;
        let keys = columns(&table, &self.keys)?;

        let mut seen = HashSet::with_capacity(table.num_rows());
        let keep: Vec<usize> = (0..table.num_rows())
            .filter(|&row| seen.insert(row_key(&keys, row)))
            .collect();

        trace!(
            input = table.num_rows(),
            output = keep.len(),
            "deduplicated rows"
        );

        if keep.len() == table.num_rows() {
            return Ok(table);
        }
        Ok(table.take_rows(&keep))
    }
}

#[cfg(test)]
mod tests {
    use recipe_table::generate_table;
    use recipe_table::testutil::assert_tables_eq;

    use super::*;
    use crate::TransformError;

    #[test]
    fn keeps_first_occurrence() {
        let table = generate_table!(
            "LINK_NO" => [1_i64, 1_i64, 2_i64, 1_i64, 2_i64],
            "YEAR" => [2019_i64, 2019_i64, 2019_i64, 2020_i64, 2019_i64],
            "SPELL" => ["a", "b", "c", "d", "e"],
        );
        let out = DedupeByKeys::new(["LINK_NO", "YEAR"]).apply(table).unwrap();

        let expected = generate_table!(
            "LINK_NO" => [1_i64, 2_i64, 1_i64],
            "YEAR" => [2019_i64, 2019_i64, 2020_i64],
            "SPELL" => ["a", "c", "d"],
        );
        assert_tables_eq(&expected, &out);
    }

    #[test]
    fn null_keys_group_together() {
        let table = generate_table!(
            "k" => [recipe_table::ScalarValue::Null, recipe_table::ScalarValue::Null, "x"],
        );
        let out = DedupeByKeys::new(["k"]).apply(table).unwrap();
        assert_eq!(2, out.num_rows());
    }

    #[test]
    fn empty_keys_invalid() {
        let err = DedupeByKeys::new(Vec::<String>::new()).validate().unwrap_err();
        assert!(matches!(err, TransformError::InvalidStep(_)));
    }

    #[test]
    fn unknown_key() {
        let table = generate_table!("a" => [1_i64]);
        let err = DedupeByKeys::new(["b"]).apply(table).unwrap_err();
        assert!(matches!(err, TransformError::Table(_)));
    }
}
