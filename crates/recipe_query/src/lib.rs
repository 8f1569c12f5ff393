//! Query execution against an external database.
//!
//! A [`QuerySpec`] pairs a [`SqlTemplate`] using named `:param` placeholders
//! with bound values. [`execute`] checks every placeholder is bound, rewrites
//! the placeholders to the connection's positional style, sends a single
//! statement, and materializes the result into a [`recipe_table::Table`].
pub mod connection;
pub mod convert;
pub mod errors;
pub mod executor;
pub mod spec;
pub mod sqlite;
pub mod template;

pub use connection::{ColumnMeta, Connection, QueryResult};
pub use errors::{QueryError, Result};
pub use executor::execute;
pub use spec::QuerySpec;
pub use sqlite::SqliteConnection;
pub use template::{BoundQuery, SqlTemplate};
