use chrono::{Datelike, Days, NaiveDate};
use recipe_table::scalar::DATE_FORMAT;
use recipe_table::{Column, DataType, ScalarValue, Table};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::check_output;
use crate::errors::{Result, TransformError};

/// Part of a date to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePart {
    /// Calendar year.
    Year,
    /// Month number, 1-12.
    Month,
    /// English month name, e.g. "April".
    MonthName,
    /// Quarter of the calendar year, 1-4.
    Quarter,
    /// Monday of the ISO week containing the date.
    IsoWeekStart,
    /// Sunday of the ISO week containing the date.
    IsoWeekEnd,
    /// Financial year starting 1 April, formatted like "2019/20".
    FinancialYear,
}

impl DatePart {
    pub const fn output_type(&self) -> DataType {
        match self {
            Self::Year | Self::Month | Self::Quarter => DataType::Int64,
            Self::MonthName | Self::FinancialYear => DataType::Utf8,
            Self::IsoWeekStart | Self::IsoWeekEnd => DataType::Date,
        }
    }

    pub fn extract(&self, date: NaiveDate) -> ScalarValue {
        match self {
            Self::Year => ScalarValue::Int64(date.year() as i64),
            Self::Month => ScalarValue::Int64(date.month() as i64),
            Self::MonthName => ScalarValue::Utf8(date.format("%B").to_string()),
            Self::Quarter => ScalarValue::Int64(((date.month() - 1) / 3 + 1) as i64),
            Self::IsoWeekStart => {
                let offset = date.weekday().num_days_from_monday() as u64;
                date.checked_sub_days(Days::new(offset)).into()
            }
            Self::IsoWeekEnd => {
                let offset = 6 - date.weekday().num_days_from_monday() as u64;
                date.checked_add_days(Days::new(offset)).into()
            }
            Self::FinancialYear => {
                let start = if date.month() >= 4 {
                    date.year()
                } else {
                    date.year() - 1
                };
                ScalarValue::Utf8(format!("{start}/{:02}", (start + 1).rem_euclid(100)))
            }
        }
    }
}

/// Parse a date column and derive one part of it into a new column.
///
/// Date columns are used as is. Text columns are parsed with `format`
/// (`%Y-%m-%d` if unset). Null and blank values produce null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveDatePart {
    pub column: String,
    pub output: String,
    pub part: DatePart,
    /// chrono format string used to parse text values.
    #[serde(default)]
    pub format: Option<String>,
    /// Produce null for unparseable values instead of failing.
    #[serde(default)]
    pub coerce_invalid: bool,
    #[serde(default)]
    pub overwrite: bool,
}

impl DeriveDatePart {
    pub fn new(column: impl Into<String>, output: impl Into<String>, part: DatePart) -> Self {
        DeriveDatePart {
            column: column.into(),
            output: output.into(),
            part,
            format: None,
            coerce_invalid: false,
            overwrite: false,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_coerce_invalid(mut self, coerce: bool) -> Self {
        self.coerce_invalid = coerce;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DATE_FORMAT)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.format().trim().is_empty() {
            return Err(TransformError::InvalidStep(
                "date format must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn apply(&self, mut table: Table) -> Result<Table> {
        self.validate()?;
        let source = table.column(&self.column)?;
        check_output(&table, &self.output, self.overwrite)?;

        if !matches!(
            source.datatype(),
            DataType::Date | DataType::Utf8 | DataType::Any
        ) {
            return Err(self.type_mismatch(source.datatype()));
        }

        let format = self.format();
        let mut values = Vec::with_capacity(source.len());
        for (row, value) in source.values().iter().enumerate() {
            let date = match value {
                ScalarValue::Null => None,
                ScalarValue::Date(date) => Some(*date),
                ScalarValue::Utf8(s) if s.trim().is_empty() => None,
                ScalarValue::Utf8(s) => match NaiveDate::parse_from_str(s.trim(), format) {
                    Ok(date) => Some(date),
                    Err(_) if self.coerce_invalid => {
                        trace!(row, value = %s, "coercing unparseable date to null");
                        None
                    }
                    Err(_) => {
                        return Err(TransformError::DateParseError {
                            column: self.column.clone(),
                            row,
                            value: s.clone(),
                            format: format.to_string(),
                        });
                    }
                },
                other => {
                    // Only reachable for `Any` columns holding other kinds.
                    return Err(self.type_mismatch(other.datatype().unwrap_or(DataType::Any)));
                }
            };
            values.push(match date {
                Some(date) => self.part.extract(date),
                None => ScalarValue::Null,
            });
        }

        let column = Column::try_new(self.output.clone(), self.part.output_type(), values)?;
        table.set_column(column)?;

        Ok(table)
    }

    fn type_mismatch(&self, got: DataType) -> TransformError {
        TransformError::TypeMismatch {
            column: self.column.clone(),
            expected: "date or text",
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use recipe_table::generate_table;
    use recipe_table::testutil::assert_columns_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn extract_parts() {
        // 2020-03-31 is a Tuesday.
        let d = date(2020, 3, 31);
        assert_eq!(ScalarValue::Int64(2020), DatePart::Year.extract(d));
        assert_eq!(ScalarValue::Int64(3), DatePart::Month.extract(d));
        assert_eq!(ScalarValue::from("March"), DatePart::MonthName.extract(d));
        assert_eq!(ScalarValue::Int64(1), DatePart::Quarter.extract(d));
        assert_eq!(ScalarValue::Date(date(2020, 3, 30)), DatePart::IsoWeekStart.extract(d));
        assert_eq!(ScalarValue::Date(date(2020, 4, 5)), DatePart::IsoWeekEnd.extract(d));
        assert_eq!(ScalarValue::from("2019/20"), DatePart::FinancialYear.extract(d));
        assert_eq!(
            ScalarValue::from("2020/21"),
            DatePart::FinancialYear.extract(date(2020, 4, 1))
        );
        assert_eq!(
            ScalarValue::from("1999/00"),
            DatePart::FinancialYear.extract(date(2000, 1, 15))
        );
    }

    #[test]
    fn derive_from_text_with_format() {
        let table = generate_table!("ADMISSION_DATE" => ["02/05/2019", "14/02/2020", ScalarValue::Null]);
        let step = DeriveDatePart::new("ADMISSION_DATE", "YEAR", DatePart::Year).with_format("%d/%m/%Y");

        let out = step.apply(table).unwrap();
        assert_eq!(vec!["ADMISSION_DATE", "YEAR"], out.column_names());
        let expected = Column::try_new(
            "YEAR",
            DataType::Int64,
            vec![2019_i64.into(), 2020_i64.into(), ScalarValue::Null],
        )
        .unwrap();
        assert_columns_eq(&expected, out.column("YEAR").unwrap());
    }

    #[test]
    fn derive_from_date_column() {
        let table = generate_table!("d" => [date(2019, 5, 2)]);
        let out = DeriveDatePart::new("d", "wk", DatePart::IsoWeekStart)
            .apply(table)
            .unwrap();
        // 2019-05-02 is a Thursday.
        assert_eq!(
            &[ScalarValue::Date(date(2019, 4, 29))],
            out.column("wk").unwrap().values()
        );
        assert_eq!(DataType::Date, out.column("wk").unwrap().datatype());
    }

    #[test]
    fn unparseable_fails() {
        let table = generate_table!("d" => ["2019-05-02", "not a date"]);
        let err = DeriveDatePart::new("d", "y", DatePart::Year)
            .apply(table)
            .unwrap_err();
        match err {
            TransformError::DateParseError { column, row, value, .. } => {
                assert_eq!("d", column);
                assert_eq!(1, row);
                assert_eq!("not a date", value);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_coerced_to_null() {
        let table = generate_table!("d" => ["2019-05-02", "not a date"]);
        let out = DeriveDatePart::new("d", "y", DatePart::Year)
            .with_coerce_invalid(true)
            .apply(table)
            .unwrap();
        assert_eq!(
            &[ScalarValue::Int64(2019), ScalarValue::Null],
            out.column("y").unwrap().values()
        );
    }

    #[test]
    fn non_date_column_is_type_mismatch() {
        let table = generate_table!("n" => [1_i64]);
        let err = DeriveDatePart::new("n", "y", DatePart::Year)
            .apply(table)
            .unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { .. }));
    }

    #[test]
    fn output_collision_requires_overwrite() {
        let table = generate_table!("d" => ["2019-05-02"], "y" => ["old"]);
        let step = DeriveDatePart::new("d", "y", DatePart::Year);
        let err = step.apply(table.clone()).unwrap_err();
        assert!(matches!(err, TransformError::OutputCollision(_)));

        let out = step.with_overwrite(true).apply(table).unwrap();
        assert_eq!(vec!["d", "y"], out.column_names());
        assert_eq!(&[ScalarValue::Int64(2019)], out.column("y").unwrap().values());
    }
}
