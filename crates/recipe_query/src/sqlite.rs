use std::fmt;
use std::path::{Path, PathBuf};

use recipe_table::scalar::DATE_FORMAT;
use recipe_table::{DataType, ScalarValue};
use rusqlite::OpenFlags;
use rusqlite::types::{Value, ValueRef};
use tracing::debug;

use crate::connection::{ColumnMeta, Connection, QueryResult};
use crate::errors::{QueryError, Result};

/// A blocking connection to a SQLite database.
pub struct SqliteConnection {
    /// Path to the database file, None for in-memory databases.
    path: Option<PathBuf>,
    inner: Option<rusqlite::Connection>,
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "SqliteConnection({})", path.to_string_lossy()),
            None => write!(f, "SqliteConnection(:memory:)"),
        }
    }
}

impl SqliteConnection {
    /// Open an existing database file for reading.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = rusqlite::Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        debug!(path = %path.display(), "opened sqlite database");
        Ok(SqliteConnection {
            path: Some(path),
            inner: Some(inner),
        })
    }

    /// Open (creating if needed) a database file for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = rusqlite::Connection::open(&path)?;
        debug!(path = %path.display(), "opened sqlite database");
        Ok(SqliteConnection {
            path: Some(path),
            inner: Some(inner),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let inner = rusqlite::Connection::open_in_memory()?;
        Ok(SqliteConnection {
            path: None,
            inner: Some(inner),
        })
    }

    /// Execute one or more statements that return no rows.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Close the connection. Further queries fail with
    /// [`QueryError::ConnectionClosed`].
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.inner.take() {
            conn.close().map_err(|(_, e)| QueryError::from(e))?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<&rusqlite::Connection> {
        self.inner.as_ref().ok_or(QueryError::ConnectionClosed)
    }
}

impl Connection for SqliteConnection {
    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn query(&mut self, sql: &str, params: &[ScalarValue]) -> Result<QueryResult> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<_> = stmt
            .columns()
            .into_iter()
            .map(|col| ColumnMeta::new(col.name(), col.decl_type().and_then(decl_type)))
            .collect();
        let num_cols = columns.len();

        let params = params.iter().map(to_sqlite_value).collect::<Vec<_>>();
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..num_cols)
                .map(|idx| from_sqlite_value(&columns[idx].name, row.get_ref(idx)?))
                .collect::<Result<Vec<_>>>()?;
            out.push(values);
        }

        Ok(QueryResult { columns, rows: out })
    }
}

/// Map a declared SQLite column type to a data type.
///
/// Follows SQLite's affinity rules loosely.
fn decl_type(decl: &str) -> Option<DataType> {
    let decl = decl.to_ascii_lowercase();
    Some(match decl.as_str() {
        "boolean" | "bool" => DataType::Boolean,
        "date" => DataType::Date,
        s if s.contains("int") => DataType::Int64,
        s if s.contains("char") || s.contains("clob") || s.contains("text") => DataType::Utf8,
        s if s.contains("real")
            || s.contains("floa")
            || s.contains("doub")
            || s.contains("decimal")
            || s.contains("numeric") =>
        {
            DataType::Float64
        }
        _ => return None,
    })
}

fn to_sqlite_value(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Null => Value::Null,
        ScalarValue::Boolean(v) => Value::Integer(*v as i64),
        ScalarValue::Int64(v) => Value::Integer(*v),
        ScalarValue::Float64(v) => Value::Real(*v),
        ScalarValue::Date(v) => Value::Text(v.format(DATE_FORMAT).to_string()),
        ScalarValue::Utf8(v) => Value::Text(v.clone()),
    }
}

fn from_sqlite_value(column: &str, value: ValueRef<'_>) -> Result<ScalarValue> {
    Ok(match value {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Integer(v) => ScalarValue::Int64(v),
        ValueRef::Real(v) => ScalarValue::Float64(v),
        ValueRef::Text(v) => ScalarValue::Utf8(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(_) => {
            return Err(QueryError::UnsupportedType {
                column: column.to_string(),
                typ: "blob".to_string(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_types() {
        assert_eq!(Some(DataType::Int64), decl_type("INTEGER"));
        assert_eq!(Some(DataType::Utf8), decl_type("VARCHAR(10)"));
        assert_eq!(Some(DataType::Float64), decl_type("DECIMAL(10,2)"));
        assert_eq!(Some(DataType::Date), decl_type("DATE"));
        assert_eq!(Some(DataType::Boolean), decl_type("BOOLEAN"));
        assert_eq!(None, decl_type("BLOB"));
    }

    #[test]
    fn query_returns_rows_and_metadata() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (a INTEGER, b TEXT);
             INSERT INTO t VALUES (1, 'x'), (2, NULL);",
        )
        .unwrap();

        let result = conn
            .query("SELECT a, b FROM t WHERE a >= ?1 ORDER BY a", &[ScalarValue::Int64(1)])
            .unwrap();
        assert_eq!(
            vec![
                ColumnMeta::new("a", Some(DataType::Int64)),
                ColumnMeta::new("b", Some(DataType::Utf8)),
            ],
            result.columns
        );
        assert_eq!(
            vec![
                vec![ScalarValue::Int64(1), "x".into()],
                vec![ScalarValue::Int64(2), ScalarValue::Null],
            ],
            result.rows
        );
    }

    #[test]
    fn driver_error_is_execution_error() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        let err = conn.query("SELECT * FROM missing_table", &[]).unwrap_err();
        match err {
            QueryError::ExecutionError { message } => {
                assert!(message.contains("missing_table"), "message: {message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn closed_connection() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.close().unwrap();
        assert!(!conn.is_open());
        assert!(matches!(
            conn.query("SELECT 1", &[]),
            Err(QueryError::ConnectionClosed)
        ));
    }

    #[test]
    fn open_read_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        {
            let mut conn = SqliteConnection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (7);")
                .unwrap();
        }

        let mut conn = SqliteConnection::open_read_only(&path).unwrap();
        let result = conn.query("SELECT a FROM t", &[]).unwrap();
        assert_eq!(vec![vec![ScalarValue::Int64(7)]], result.rows);
        assert!(conn.execute_batch("INSERT INTO t VALUES (8)").is_err());
    }
}
