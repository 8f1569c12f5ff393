//! Result tables produced by queries and consumed by transform pipelines.
//!
//! A [`Table`] is an ordered set of uniquely named [`Column`]s that all share
//! one row count. Each column declares a [`DataType`] and holds one
//! [`ScalarValue`] per row. Every column is nullable.
pub mod column;
pub mod datatype;
pub mod errors;
pub mod scalar;
pub mod table;

pub mod testutil;

pub use column::Column;
pub use datatype::DataType;
pub use errors::{Result, TableError};
pub use scalar::{GroupKey, ScalarValue};
pub use table::Table;
