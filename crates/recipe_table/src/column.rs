use crate::datatype::DataType;
use crate::errors::{Result, TableError};
use crate::scalar::ScalarValue;

/// A named, typed sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    datatype: DataType,
    values: Vec<ScalarValue>,
}

impl Column {
    /// Create a new column, checking that every non-null value matches the
    /// declared type.
    pub fn try_new(
        name: impl Into<String>,
        datatype: DataType,
        values: Vec<ScalarValue>,
    ) -> Result<Self> {
        let name = name.into();
        for value in &values {
            if let Some(got) = value.datatype() {
                if !datatype.accepts(got) {
                    return Err(TableError::TypeMismatch {
                        column: name,
                        expected: datatype,
                        got,
                    });
                }
            }
        }

        Ok(Column {
            name,
            datatype,
            values,
        })
    }

    /// Create a column whose type is inferred from its values.
    ///
    /// If all non-null values share a kind, that kind is used. Otherwise the
    /// column is `Any`.
    pub fn infer(name: impl Into<String>, values: Vec<ScalarValue>) -> Self {
        let datatype = infer_datatype(&values);
        Column {
            name: name.into(),
            datatype,
            values,
        }
    }

    /// Create an all-null column.
    pub fn nulls(name: impl Into<String>, datatype: DataType, len: usize) -> Self {
        Column {
            name: name.into(),
            datatype,
            values: vec![ScalarValue::Null; len],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    pub fn value(&self, row: usize) -> Option<&ScalarValue> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<ScalarValue> {
        self.values
    }

    /// Build a new column from the values at the given row indices.
    ///
    /// Indices must be in bounds.
    pub fn take(&self, indices: &[usize]) -> Self {
        Column {
            name: self.name.clone(),
            datatype: self.datatype,
            values: indices
                .iter()
                .map(|&idx| self.values[idx].clone())
                .collect(),
        }
    }
}

/// Infer a column type from a set of values.
pub fn infer_datatype(values: &[ScalarValue]) -> DataType {
    let mut inferred = None;
    for value in values {
        match (inferred, value.datatype()) {
            (_, None) => (),
            (None, Some(datatype)) => inferred = Some(datatype),
            (Some(prev), Some(datatype)) if prev == datatype => (),
            (Some(_), Some(_)) => return DataType::Any,
        }
    }
    inferred.unwrap_or(DataType::Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_wrong_kind() {
        let err = Column::try_new(
            "age",
            DataType::Int64,
            vec![ScalarValue::Int64(4), ScalarValue::from("five")],
        )
        .unwrap_err();
        assert_eq!(
            TableError::TypeMismatch {
                column: "age".to_string(),
                expected: DataType::Int64,
                got: DataType::Utf8,
            },
            err
        );
    }

    #[test]
    fn try_new_accepts_nulls() {
        let col = Column::try_new(
            "age",
            DataType::Int64,
            vec![ScalarValue::Null, ScalarValue::Int64(4)],
        )
        .unwrap();
        assert_eq!(2, col.len());
    }

    #[test]
    fn infer_mixed_is_any() {
        assert_eq!(
            DataType::Any,
            infer_datatype(&[ScalarValue::Int64(1), ScalarValue::from("a")])
        );
        assert_eq!(DataType::Any, infer_datatype(&[ScalarValue::Null]));
        assert_eq!(
            DataType::Utf8,
            infer_datatype(&[ScalarValue::Null, ScalarValue::from("a")])
        );
    }

    #[test]
    fn take_rows() {
        let col = Column::infer("a", vec![1_i64.into(), 2_i64.into(), 3_i64.into()]);
        let taken = col.take(&[2, 0]);
        assert_eq!(
            &[ScalarValue::Int64(3), ScalarValue::Int64(1)],
            taken.values()
        );
    }
}
