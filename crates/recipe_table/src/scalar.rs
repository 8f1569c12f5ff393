use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datatype::DataType;

/// Format used when dates are rendered as text or compared against text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell value.
///
/// Serialized untagged so recipe files can write literals naturally: `null`,
/// `true`, `42`, `4.5`, `"2020-04-01"` (parsed as a date when it is one), or
/// any other string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Date(NaiveDate),
    Utf8(String),
}

impl ScalarValue {
    /// Returns the data type of this value, or None if the value is null.
    pub fn datatype(&self) -> Option<DataType> {
        Some(match self {
            Self::Null => return None,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Date(_) => DataType::Date,
            Self::Utf8(_) => DataType::Utf8,
        })
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of this value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of a non-null value, None for null.
    pub fn to_text(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        Some(self.to_string())
    }

    /// Compares two values.
    ///
    /// Integers and floats compare numerically. Dates compare against text
    /// using the ISO form of the date. Returns None if either side is null or
    /// the kinds can't be compared.
    pub fn compare(&self, other: &ScalarValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Int64(a), Self::Int64(b)) => Some(a.cmp(b)),
            (Self::Utf8(a), Self::Utf8(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Utf8(b)) => {
                Some(a.format(DATE_FORMAT).to_string().as_str().cmp(b.as_str()))
            }
            (Self::Utf8(a), Self::Date(b)) => {
                Some(a.as_str().cmp(b.format(DATE_FORMAT).to_string().as_str()))
            }
            (a, b) => {
                let a = a.as_f64()?;
                let b = b.as_f64()?;
                a.partial_cmp(&b)
            }
        }
    }

    /// Ordering used when sorting rows.
    ///
    /// Unlike [`ScalarValue::compare`] this is total: nulls sort after every
    /// value, NaN sorts after every other number, and values of kinds that
    /// can't be compared order by kind.
    pub fn sort_cmp(&self, other: &ScalarValue) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Greater,
            (_, Self::Null) => Ordering::Less,
            (Self::Float64(a), Self::Float64(b)) => a.total_cmp(b),
            (a, b) => match a.compare(b) {
                Some(ord) => ord,
                None => a.kind_rank().cmp(&b.kind_rank()),
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Boolean(_) => 0,
            Self::Int64(_) | Self::Float64(_) => 1,
            Self::Date(_) => 2,
            Self::Utf8(_) => 3,
            Self::Null => 4,
        }
    }

    /// Hashable key used for grouping and deduplication.
    pub fn group_key(&self) -> GroupKey {
        match self {
            Self::Null => GroupKey::Null,
            Self::Boolean(v) => GroupKey::Boolean(*v),
            Self::Int64(v) => GroupKey::Int64(*v),
            Self::Float64(v) => {
                // Normalize so that -0.0 and 0.0 (and all NaNs) group together.
                let v = if *v == 0.0 {
                    0.0
                } else if v.is_nan() {
                    f64::NAN
                } else {
                    *v
                };
                GroupKey::Float64(v.to_bits())
            }
            Self::Date(v) => GroupKey::Date(*v),
            Self::Utf8(v) => GroupKey::Utf8(v.clone()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Utf8(v) => write!(f, "{v}"),
        }
    }
}

/// Hashable, comparable-by-identity form of a [`ScalarValue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Null,
    Boolean(bool),
    Int64(i64),
    /// Bit pattern of a normalized float.
    Float64(u64),
    Date(NaiveDate),
    Utf8(String),
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int64(value as i64)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        ScalarValue::Date(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => ScalarValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn compare_numeric_across_kinds() {
        let a = ScalarValue::Int64(4);
        let b = ScalarValue::Float64(4.5);
        assert_eq!(Some(Ordering::Less), a.compare(&b));
        assert_eq!(Some(Ordering::Greater), b.compare(&a));
    }

    #[test]
    fn compare_with_null_is_none() {
        assert_eq!(None, ScalarValue::Null.compare(&ScalarValue::Int64(1)));
        assert_eq!(None, ScalarValue::Int64(1).compare(&ScalarValue::Null));
    }

    #[test]
    fn compare_date_with_text() {
        let d = ScalarValue::Date(date(2020, 4, 1));
        assert_eq!(Some(Ordering::Equal), d.compare(&"2020-04-01".into()));
        assert_eq!(Some(Ordering::Less), d.compare(&"2021-01-01".into()));
    }

    #[test]
    fn compare_incompatible_kinds() {
        assert_eq!(None, ScalarValue::Boolean(true).compare(&"a".into()));
    }

    #[test]
    fn sort_cmp_nulls_last() {
        let mut vals = vec![
            ScalarValue::Null,
            ScalarValue::Int64(3),
            ScalarValue::Float64(1.5),
        ];
        vals.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(
            vec![
                ScalarValue::Float64(1.5),
                ScalarValue::Int64(3),
                ScalarValue::Null
            ],
            vals
        );
    }

    #[test]
    fn group_key_normalizes_zero() {
        assert_eq!(
            ScalarValue::Float64(0.0).group_key(),
            ScalarValue::Float64(-0.0).group_key()
        );
        assert_ne!(
            ScalarValue::Int64(1).group_key(),
            ScalarValue::Float64(1.0).group_key()
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            "2020-04-01",
            ScalarValue::Date(date(2020, 4, 1)).to_string()
        );
        assert_eq!("4.5", ScalarValue::Float64(4.5).to_string());
        assert_eq!(None, ScalarValue::Null.to_text());
    }

    #[test]
    fn deserialize_untagged_literals() {
        let vals: Vec<ScalarValue> =
            serde_json::from_str(r#"[null, true, 42, 4.5, "2020-04-01", "I21"]"#).unwrap();
        assert_eq!(
            vec![
                ScalarValue::Null,
                ScalarValue::Boolean(true),
                ScalarValue::Int64(42),
                ScalarValue::Float64(4.5),
                ScalarValue::Date(date(2020, 4, 1)),
                ScalarValue::Utf8("I21".to_string()),
            ],
            vals
        );
    }
}
