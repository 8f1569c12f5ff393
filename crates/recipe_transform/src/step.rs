use std::fmt;

use recipe_table::Table;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::steps::aggregate::GroupAggregate;
use crate::steps::bucket::BucketNumeric;
use crate::steps::date_part::DeriveDatePart;
use crate::steps::dedupe::DedupeByKeys;
use crate::steps::filter::FilterRows;
use crate::steps::lookup::MapLookup;
use crate::steps::pivot::Pivot;
use crate::steps::regex_flag::RegexFlag;
use crate::steps::select::SelectColumns;
use crate::steps::sort::SortRows;

/// A single transform step.
///
/// Serialized with a `kind` tag alongside the step's parameters, e.g.
/// `{"kind": "dedupe_by_keys", "keys": ["LINK_NO", "YEAR"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    DeriveDatePart(DeriveDatePart),
    BucketNumeric(BucketNumeric),
    MapLookup(MapLookup),
    DedupeByKeys(DedupeByKeys),
    GroupAggregate(GroupAggregate),
    RegexFlag(RegexFlag),
    FilterRows(FilterRows),
    Pivot(Pivot),
    SelectColumns(SelectColumns),
    SortRows(SortRows),
}

/// Tag identifying the kind of a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    DeriveDatePart,
    BucketNumeric,
    MapLookup,
    DedupeByKeys,
    GroupAggregate,
    RegexFlag,
    FilterRows,
    Pivot,
    SelectColumns,
    SortRows,
}

impl StepKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DeriveDatePart => "derive_date_part",
            Self::BucketNumeric => "bucket_numeric",
            Self::MapLookup => "map_lookup",
            Self::DedupeByKeys => "dedupe_by_keys",
            Self::GroupAggregate => "group_aggregate",
            Self::RegexFlag => "regex_flag",
            Self::FilterRows => "filter_rows",
            Self::Pivot => "pivot",
            Self::SelectColumns => "select_columns",
            Self::SortRows => "sort_rows",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::DeriveDatePart(_) => StepKind::DeriveDatePart,
            Self::BucketNumeric(_) => StepKind::BucketNumeric,
            Self::MapLookup(_) => StepKind::MapLookup,
            Self::DedupeByKeys(_) => StepKind::DedupeByKeys,
            Self::GroupAggregate(_) => StepKind::GroupAggregate,
            Self::RegexFlag(_) => StepKind::RegexFlag,
            Self::FilterRows(_) => StepKind::FilterRows,
            Self::Pivot(_) => StepKind::Pivot,
            Self::SelectColumns(_) => StepKind::SelectColumns,
            Self::SortRows(_) => StepKind::SortRows,
        }
    }

    /// Check parameters that don't depend on the table.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::DeriveDatePart(s) => s.validate(),
            Self::BucketNumeric(s) => s.validate(),
            Self::MapLookup(_) => Ok(()),
            Self::DedupeByKeys(s) => s.validate(),
            Self::GroupAggregate(s) => s.validate(),
            Self::RegexFlag(s) => s.validate(),
            Self::FilterRows(_) => Ok(()),
            Self::Pivot(s) => s.validate(),
            Self::SelectColumns(s) => s.validate(),
            Self::SortRows(s) => s.validate(),
        }
    }

    /// Apply this step, consuming the input table.
    pub fn apply(&self, table: Table) -> Result<Table> {
        match self {
            Self::DeriveDatePart(s) => s.apply(table),
            Self::BucketNumeric(s) => s.apply(table),
            Self::MapLookup(s) => s.apply(table),
            Self::DedupeByKeys(s) => s.apply(table),
            Self::GroupAggregate(s) => s.apply(table),
            Self::RegexFlag(s) => s.apply(table),
            Self::FilterRows(s) => s.apply(table),
            Self::Pivot(s) => s.apply(table),
            Self::SelectColumns(s) => s.apply(table),
            Self::SortRows(s) => s.apply(table),
        }
    }
}

macro_rules! impl_from_step {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Step {
                fn from(value: $variant) -> Self {
                    Step::$variant(value)
                }
            }
        )*
    };
}

impl_from_step!(
    DeriveDatePart,
    BucketNumeric,
    MapLookup,
    DedupeByKeys,
    GroupAggregate,
    RegexFlag,
    FilterRows,
    Pivot,
    SelectColumns,
    SortRows,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::date_part::DatePart;

    #[test]
    fn deserialize_tagged_steps() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                {"kind": "derive_date_part", "column": "ADMISSION_DATE", "output": "MONTH", "part": "month_name"},
                {"kind": "dedupe_by_keys", "keys": ["LINK_NO", "YEAR"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            vec![
                Step::DeriveDatePart(DeriveDatePart::new(
                    "ADMISSION_DATE",
                    "MONTH",
                    DatePart::MonthName
                )),
                Step::DedupeByKeys(DedupeByKeys::new(["LINK_NO", "YEAR"])),
            ],
            steps
        );
    }

    #[test]
    fn unknown_kind_rejected() {
        let res: std::result::Result<Step, serde_json::Error> =
            serde_json::from_str(r#"{"kind": "explode", "column": "a"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn kind_names() {
        assert_eq!("bucket_numeric", StepKind::BucketNumeric.to_string());
        let step: Step = DedupeByKeys::new(["a"]).into();
        assert_eq!(StepKind::DedupeByKeys, step.kind());
    }
}
