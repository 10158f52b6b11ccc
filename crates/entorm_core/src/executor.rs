//! Database driver seam.
//!
//! The entity manager never talks to a database directly. It renders
//! [`Statement`]s and hands them to an [`Executor`], which returns plain
//! [`Row`]s. Driver crates implement `Executor` for their connection type.

use crate::error::{CoreError, CoreResult};
use crate::sql::Statement;
use crate::value::{FromValue, Value};
use std::sync::Arc;

/// A row returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row. `columns` and `values` must have the same length.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> CoreResult<Self> {
        if columns.len() != values.len() {
            return Err(CoreError::invalid_operation(format!(
                "row has {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the raw value of `column`.
    ///
    /// Column names are matched case-insensitively, since some databases
    /// fold unquoted identifiers to upper case.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` if the row has no such column.
    pub fn value(&self, column: &str) -> CoreResult<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .map(|i| &self.values[i])
            .ok_or_else(|| CoreError::unknown_column(column))
    }

    /// Returns `column` converted to `V`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or cannot be converted.
    pub fn get<V: FromValue>(&self, column: &str) -> CoreResult<V> {
        V::from_value(self.value(column)?, column)
    }

    /// Returns the values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Executes statements against a database connection.
///
/// Implementations are used from a single session and need not be
/// thread-safe.
pub trait Executor {
    /// Executes a statement that returns no rows.
    ///
    /// Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Driver` if the database rejects the statement.
    fn execute(&mut self, statement: &Statement) -> CoreResult<u64>;

    /// Executes one or more parameterless statements, such as DDL.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Driver` if the database rejects the statement.
    fn execute_batch(&mut self, sql: &str) -> CoreResult<()>;

    /// Executes a query and collects all rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Driver` if the query fails.
    fn query(&mut self, statement: &Statement) -> CoreResult<Vec<Row>>;

    /// Returns the key generated by the most recent insert.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Driver` if the driver cannot report it.
    fn last_insert_id(&mut self) -> CoreResult<i64>;
}

impl<X: Executor + ?Sized> Executor for &mut X {
    fn execute(&mut self, statement: &Statement) -> CoreResult<u64> {
        (**self).execute(statement)
    }

    fn execute_batch(&mut self, sql: &str) -> CoreResult<()> {
        (**self).execute_batch(sql)
    }

    fn query(&mut self, statement: &Statement) -> CoreResult<Vec<Row>> {
        (**self).query(statement)
    }

    fn last_insert_id(&mut self) -> CoreResult<i64> {
        (**self).last_insert_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::from(vec!["ID".to_string(), "name".to_string()]),
            vec![Value::Integer(1), Value::Null],
        )
        .unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let row = row();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<Option<String>>("NAME").unwrap(), None);
    }

    #[test]
    fn unknown_column() {
        let err = row().value("email").unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn { column } if column == "email"));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let result = Row::new(Arc::from(vec!["id".to_string()]), vec![]);
        assert!(result.is_err());
    }
}
