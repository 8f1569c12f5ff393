use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared kind of a column.
///
/// All columns are nullable, so there is no separate nullable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Utf-8 text.
    Utf8,
    /// Signed 64bit integer.
    Int64,
    /// 64bit float. Database decimals are materialized as this.
    Float64,
    /// Calendar date without a time zone.
    Date,
    /// True or false.
    Boolean,
    /// Column with no single declared kind.
    ///
    /// Produced when the driver reports no type and the values are either all
    /// null or of mixed kinds. Accepts values of any kind.
    Any,
}

impl DataType {
    pub const fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }

    /// Returns if a value of type `other` may be stored in a column of this
    /// type.
    pub fn accepts(&self, other: DataType) -> bool {
        *self == DataType::Any || *self == other
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "Utf8"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float64 => write!(f, "Float64"),
            Self::Date => write!(f, "Date"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Any => write!(f, "Any"),
        }
    }
}
