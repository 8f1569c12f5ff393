//! CSV export for result tables.
pub mod dialect;
pub mod errors;
pub mod writer;

pub use dialect::DialectOptions;
pub use errors::{CsvExportError, Result};
pub use writer::{CsvWriter, write_table_to_path};
