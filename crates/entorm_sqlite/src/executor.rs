//! `Executor` implementation over a rusqlite connection.

use crate::config::SqliteConfig;
use crate::db;
use crate::error::{from_rusqlite, SqliteError, SqliteResult};
use entorm_core::sql::Statement;
use entorm_core::{CoreResult, Executor, Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::sync::Arc;

/// Runs session statements on a SQLite connection.
///
/// # Example
///
/// ```rust
/// use entorm_core::sql::Statement;
/// use entorm_core::{Executor, Value};
/// use entorm_sqlite::SqliteExecutor;
///
/// let mut executor = SqliteExecutor::open_in_memory().unwrap();
/// executor.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
///
/// let mut insert = Statement::new("INSERT INTO t (name) VALUES (?)");
/// insert.params.push(Value::from("kim"));
/// executor.execute(&insert).unwrap();
///
/// let rows = executor.query(&Statement::new("SELECT id, name FROM t")).unwrap();
/// assert_eq!(rows[0].get::<String>("name").unwrap(), "kim");
/// ```
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Wraps an already open connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens a connection as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or configured.
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        Ok(Self::new(db::open(config)?))
    }

    /// Opens a private in-memory database with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::open(&SqliteConfig::new())
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the underlying connection, consuming the executor.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl Executor for SqliteExecutor {
    fn execute(&mut self, statement: &Statement) -> CoreResult<u64> {
        let affected = self
            .conn
            .execute(&statement.sql, params_from_iter(bind(&statement.params)))
            .map_err(from_rusqlite)?;
        Ok(affected as u64)
    }

    fn execute_batch(&mut self, sql: &str) -> CoreResult<()> {
        self.conn.execute_batch(sql).map_err(from_rusqlite)
    }

    fn query(&mut self, statement: &Statement) -> CoreResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(&statement.sql).map_err(from_rusqlite)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into();

        let mut rows = stmt
            .query(params_from_iter(bind(&statement.params)))
            .map_err(from_rusqlite)?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            let mut values = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                let raw = row.get_ref(index).map_err(from_rusqlite)?;
                values.push(read_value(column, raw)?);
            }
            result.push(Row::new(Arc::clone(&columns), values)?);
        }
        Ok(result)
    }

    fn last_insert_id(&mut self) -> CoreResult<i64> {
        Ok(self.conn.last_insert_rowid())
    }
}

fn bind(params: &[Value]) -> impl Iterator<Item = SqlValue> + '_ {
    params.iter().map(|value| match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
    })
}

fn read_value(column: &str, raw: ValueRef<'_>) -> SqliteResult<Value> {
    match raw {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(r) => Ok(Value::Real(r)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|source| SqliteError::InvalidText {
                column: column.to_string(),
                source,
            }),
        ValueRef::Blob(_) => Err(SqliteError::UnsupportedColumn {
            column: column.to_string(),
            kind: "BLOB",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entorm_core::CoreError;

    fn executor() -> SqliteExecutor {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .execute_batch(
                "CREATE TABLE person (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    age INTEGER,
                    active INTEGER,
                    score REAL
                )",
            )
            .unwrap();
        executor
    }

    fn statement(sql: &str, params: Vec<Value>) -> Statement {
        Statement {
            sql: sql.to_string(),
            params,
        }
    }

    #[test]
    fn insert_and_query_round_trip() {
        let mut executor = executor();
        let affected = executor
            .execute(&statement(
                "INSERT INTO person (name, age, active, score) VALUES (?, ?, ?, ?)",
                vec!["kim".into(), 30i64.into(), true.into(), 1.5.into()],
            ))
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(executor.last_insert_id().unwrap(), 1);

        let rows = executor
            .query(&statement(
                "SELECT id, name, age, active, score FROM person WHERE id = ?",
                vec![1i64.into()],
            ))
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get::<String>("name").unwrap(), "kim");
        assert_eq!(row.get::<i32>("age").unwrap(), 30);
        assert!(row.get::<bool>("active").unwrap());
        assert_eq!(row.get::<f64>("score").unwrap(), 1.5);
    }

    #[test]
    fn nulls_round_trip() {
        let mut executor = executor();
        executor
            .execute(&statement(
                "INSERT INTO person (name, age) VALUES (?, ?)",
                vec!["lee".into(), Value::Null],
            ))
            .unwrap();
        let rows = executor
            .query(&Statement::new("SELECT age FROM person"))
            .unwrap();
        assert_eq!(rows[0].get::<Option<i64>>("age").unwrap(), None);
    }

    #[test]
    fn empty_result() {
        let mut executor = executor();
        let rows = executor
            .query(&statement(
                "SELECT id FROM person WHERE id = ?",
                vec![42i64.into()],
            ))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn update_reports_affected_rows() {
        let mut executor = executor();
        executor
            .execute(&statement(
                "INSERT INTO person (name) VALUES (?)",
                vec!["kim".into()],
            ))
            .unwrap();
        let affected = executor
            .execute(&statement(
                "UPDATE person SET name = ? WHERE id = ?",
                vec!["park".into(), 99i64.into()],
            ))
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn blob_columns_are_rejected() {
        let mut executor = executor();
        executor
            .execute_batch("CREATE TABLE files (data BLOB); INSERT INTO files VALUES (x'00ff');")
            .unwrap();
        let err = executor
            .query(&Statement::new("SELECT data FROM files"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Driver(_)));
    }

    #[test]
    fn sql_errors_surface_as_driver_errors() {
        let mut executor = executor();
        let err = executor
            .execute_batch("SELECT * FROM missing_table")
            .unwrap_err();
        assert!(matches!(err, CoreError::Driver(_)));
    }
}
