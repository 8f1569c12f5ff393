//! Test utilities.
//!
//! Note that this isn't behind a `#[cfg(test)]` flag since this should be
//! usable outside of this crate.
//!
//! Should not be used outside of tests.

use crate::column::Column;
use crate::table::Table;

/// Generate a table from name/value lists, inferring column types.
///
/// Panics if the columns don't line up.
///
/// ```
/// use recipe_table::generate_table;
///
/// let table = generate_table!(
///     "LINK_NO" => [1_i64, 2],
///     "HBRES" => ["S08000019", "S08000099"],
/// );
/// assert_eq!(2, table.num_rows());
/// ```
#[macro_export]
macro_rules! generate_table {
    ( $( $name:literal => [ $( $value:expr ),* $(,)? ] ),* $(,)? ) => {
        $crate::table::Table::try_from_pairs([
            $( ($name, vec![ $( $crate::scalar::ScalarValue::from($value) ),* ]) ),*
        ])
        .expect("generated table to be valid")
    };
}

/// Asserts that two columns are equal in name, type and values.
pub fn assert_columns_eq(a: &Column, b: &Column) {
    assert_eq!(a.name(), b.name(), "column names differ");
    assert_eq!(
        a.datatype(),
        b.datatype(),
        "data types differ for column '{}'",
        a.name()
    );
    assert_eq!(a.len(), b.len(), "lengths differ for column '{}'", a.name());

    for (row_idx, (a_val, b_val)) in a.values().iter().zip(b.values()).enumerate() {
        assert_eq!(
            a_val,
            b_val,
            "values differ for column '{}' at row {row_idx}",
            a.name()
        );
    }
}

/// Asserts that two tables are equal, column by column.
pub fn assert_tables_eq(a: &Table, b: &Table) {
    assert_eq!(a.column_names(), b.column_names(), "column names differ");
    assert_eq!(a.num_rows(), b.num_rows(), "num rows differ");

    for (a_col, b_col) in a.columns().iter().zip(b.columns()) {
        assert_columns_eq(a_col, b_col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataType;
    use crate::scalar::ScalarValue;

    #[test]
    fn tables_eq() {
        let a = generate_table!("a" => [1_i64, 2], "b" => ["x", "y"]);
        let b = generate_table!("a" => [1_i64, 2], "b" => ["x", "y"]);
        assert_tables_eq(&a, &b);
    }

    #[test]
    fn generate_with_nulls() {
        let table = generate_table!("a" => [ScalarValue::Null, 4_i64]);
        assert_eq!(DataType::Int64, table.column("a").unwrap().datatype());
    }

    #[test]
    #[should_panic]
    fn tables_not_eq() {
        let a = generate_table!("a" => [1_i64, 2]);
        let b = generate_table!("a" => ["1", "2"]);
        assert_tables_eq(&a, &b);
    }
}
