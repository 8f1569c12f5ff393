use std::cmp::Ordering;

use recipe_table::{ScalarValue, Table};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn matches(&self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

/// A boolean condition over a row.
///
/// Comparisons involving null are false, including `ne`. Use `is_null` and
/// `is_not_null` to select on nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Compare {
        column: String,
        op: CompareOp,
        value: ScalarValue,
    },
    IsNull {
        column: String,
    },
    IsNotNull {
        column: String,
    },
    In {
        column: String,
        values: Vec<ScalarValue>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<ScalarValue>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Predicate::IsNull {
            column: column.into(),
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Predicate::IsNotNull {
            column: column.into(),
        }
    }

    /// Compute a selection over every row of the table.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<bool>> {
        let num_rows = table.num_rows();
        Ok(match self {
            Self::Compare { column, op, value } => table
                .column(column)?
                .values()
                .iter()
                .map(|v| v.compare(value).is_some_and(|ord| op.matches(ord)))
                .collect(),
            Self::IsNull { column } => table
                .column(column)?
                .values()
                .iter()
                .map(|v| v.is_null())
                .collect(),
            Self::IsNotNull { column } => table
                .column(column)?
                .values()
                .iter()
                .map(|v| !v.is_null())
                .collect(),
            Self::In { column, values } => table
                .column(column)?
                .values()
                .iter()
                .map(|v| {
                    values
                        .iter()
                        .any(|candidate| v.compare(candidate) == Some(Ordering::Equal))
                })
                .collect(),
            Self::And(preds) => {
                let mut selection = vec![true; num_rows];
                for pred in preds {
                    let other = pred.evaluate(table)?;
                    selection.iter_mut().zip(other).for_each(|(a, b)| *a &= b);
                }
                selection
            }
            Self::Or(preds) => {
                let mut selection = vec![false; num_rows];
                for pred in preds {
                    let other = pred.evaluate(table)?;
                    selection.iter_mut().zip(other).for_each(|(a, b)| *a |= b);
                }
                selection
            }
            Self::Not(pred) => pred.evaluate(table)?.into_iter().map(|b| !b).collect(),
        })
    }
}

/// Keep only rows matching a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRows {
    pub predicate: Predicate,
}

impl FilterRows {
    pub fn new(predicate: Predicate) -> Self {
        FilterRows { predicate }
    }

    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        let selection = self.predicate.evaluate(&table)?;
        let keep: Vec<usize> = selection
            .iter()
            .enumerate()
            .filter_map(|(idx, &selected)| selected.then_some(idx))
            .collect();

        trace!(input = table.num_rows(), output = keep.len(), "filtered rows");

        if keep.len() == table.num_rows() {
            return Ok(table);
        }
        Ok(table.take_rows(&keep))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use recipe_table::generate_table;
    use recipe_table::testutil::assert_tables_eq;

    use super::*;

    fn admissions() -> Table {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        generate_table!(
            "LINK_NO" => [1_i64, 2_i64, 3_i64, 4_i64],
            "AGE" => [34_i64, ScalarValue::Null, 71_i64, 8_i64],
            "ADMISSION_DATE" => [date(2019, 4, 1), date(2019, 9, 30), date(2020, 3, 31), date(2020, 4, 1)],
            "HBRES" => ["S08000019", "S08000019", "S08000020", ScalarValue::Null],
        )
    }

    fn link_nos(pred: Predicate) -> Vec<ScalarValue> {
        let out = FilterRows::new(pred).apply(admissions()).unwrap();
        out.column("LINK_NO").unwrap().values().to_vec()
    }

    #[test]
    fn compare_numeric() {
        assert_eq!(
            vec![ScalarValue::Int64(1), ScalarValue::Int64(3)],
            link_nos(Predicate::compare("AGE", CompareOp::Ge, 18_i64))
        );
        // Int compared against float literal.
        assert_eq!(
            vec![ScalarValue::Int64(4)],
            link_nos(Predicate::compare("AGE", CompareOp::Lt, 8.5))
        );
    }

    #[test]
    fn null_comparisons_are_false() {
        assert_eq!(
            vec![ScalarValue::Int64(1), ScalarValue::Int64(3), ScalarValue::Int64(4)],
            link_nos(Predicate::compare("AGE", CompareOp::Ne, 99_i64))
        );
    }

    #[test]
    fn date_against_text() {
        assert_eq!(
            vec![ScalarValue::Int64(3), ScalarValue::Int64(4)],
            link_nos(Predicate::compare("ADMISSION_DATE", CompareOp::Gt, "2019-12-31"))
        );
    }

    #[test]
    fn boolean_combinators() {
        let pred = Predicate::And(vec![
            Predicate::is_not_null("HBRES"),
            Predicate::Not(Box::new(Predicate::In {
                column: "HBRES".to_string(),
                values: vec!["S08000020".into()],
            })),
        ]);
        assert_eq!(
            vec![ScalarValue::Int64(1), ScalarValue::Int64(2)],
            link_nos(pred)
        );

        let pred = Predicate::Or(vec![
            Predicate::is_null("AGE"),
            Predicate::is_null("HBRES"),
        ]);
        assert_eq!(
            vec![ScalarValue::Int64(2), ScalarValue::Int64(4)],
            link_nos(pred)
        );
    }

    #[test]
    fn remaining_rows_unchanged() {
        let out = FilterRows::new(Predicate::compare("LINK_NO", CompareOp::Eq, 3_i64))
            .apply(admissions())
            .unwrap();
        let expected = admissions().take_rows(&[2]);
        assert_tables_eq(&expected, &out);
    }

    #[test]
    fn deserialize_predicate() {
        let pred: Predicate = serde_json::from_str(
            r#"{"and": [
                {"compare": {"column": "AGE", "op": "ge", "value": 18}},
                {"is_not_null": {"column": "HBRES"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            Predicate::And(vec![
                Predicate::compare("AGE", CompareOp::Ge, 18_i64),
                Predicate::is_not_null("HBRES"),
            ]),
            pred
        );
    }

    #[test]
    fn unknown_column() {
        let err = FilterRows::new(Predicate::is_null("nope"))
            .apply(admissions())
            .unwrap_err();
        assert!(matches!(err, crate::TransformError::Table(_)));
    }
}
