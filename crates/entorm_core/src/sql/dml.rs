//! Parameterized INSERT / SELECT / UPDATE / DELETE generation.
//!
//! Values are never inlined into SQL text; every value becomes a
//! placeholder and a parameter of the returned [`Statement`].

use crate::entity::{EntityMetadata, PrimaryKey};
use crate::error::{CoreError, CoreResult};
use crate::sql::Dialect;
use crate::value::Value;
use std::fmt;

/// A rendered SQL statement with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with dialect placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<Value>,
}

impl Statement {
    /// Creates a statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

struct Binder<'a> {
    dialect: &'a dyn Dialect,
    params: Vec<Value>,
}

impl<'a> Binder<'a> {
    fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        self.dialect.placeholder(self.params.len())
    }

    fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            params: self.params,
        }
    }
}

fn key_condition(
    binder: &mut Binder<'_>,
    metadata: &EntityMetadata,
    key: &PrimaryKey,
) -> CoreResult<String> {
    let column = metadata.primary_key()?;
    Ok(format!(
        "{} = {}",
        binder.dialect.quote_identifier(column.name),
        binder.bind(key.to_value())
    ))
}

fn column_list(dialect: &dyn Dialect, metadata: &EntityMetadata) -> String {
    metadata
        .columns()
        .iter()
        .map(|c| dialect.quote_identifier(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders an INSERT of `values` (in metadata column order).
///
/// An identity key column whose value is NULL is left out so the
/// database can generate it.
///
/// # Errors
///
/// Returns `ColumnCountMismatch` if `values` does not match the columns.
pub fn insert(
    dialect: &dyn Dialect,
    metadata: &EntityMetadata,
    values: Vec<Value>,
) -> CoreResult<Statement> {
    if values.len() != metadata.columns().len() {
        return Err(CoreError::ColumnCountMismatch {
            table: metadata.table_name().to_string(),
            expected: metadata.columns().len(),
            actual: values.len(),
        });
    }

    let mut binder = Binder::new(dialect);
    let mut names = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());

    for (column, value) in metadata.columns().iter().zip(values) {
        if column.is_identity() && value.is_null() {
            continue;
        }
        names.push(dialect.quote_identifier(column.name));
        placeholders.push(binder.bind(value));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dialect.quote_identifier(metadata.table_name()),
        names.join(", "),
        placeholders.join(", ")
    );
    Ok(binder.finish(sql))
}

/// Renders a SELECT of one row by primary key.
///
/// # Errors
///
/// Returns `MissingPrimaryKeyColumn` if the metadata has no single key.
pub fn select_by_id(
    dialect: &dyn Dialect,
    metadata: &EntityMetadata,
    key: &PrimaryKey,
) -> CoreResult<Statement> {
    let mut binder = Binder::new(dialect);
    let condition = key_condition(&mut binder, metadata, key)?;
    let sql = format!(
        "SELECT {} FROM {} WHERE {condition}",
        column_list(dialect, metadata),
        dialect.quote_identifier(metadata.table_name())
    );
    Ok(binder.finish(sql))
}

/// Renders a SELECT of every row of the table.
pub fn select_all(dialect: &dyn Dialect, metadata: &EntityMetadata) -> Statement {
    Statement::new(format!(
        "SELECT {} FROM {}",
        column_list(dialect, metadata),
        dialect.quote_identifier(metadata.table_name())
    ))
}

/// Renders an UPDATE of the given columns for the row with `key`.
///
/// # Errors
///
/// Returns `InvalidOperation` if `columns` is empty or names an unknown
/// or key column.
pub fn update_columns(
    dialect: &dyn Dialect,
    metadata: &EntityMetadata,
    columns: Vec<(&str, Value)>,
    key: &PrimaryKey,
) -> CoreResult<Statement> {
    if columns.is_empty() {
        return Err(CoreError::invalid_operation(format!(
            "update of {} without columns",
            metadata.table_name()
        )));
    }

    let mut binder = Binder::new(dialect);
    let mut assignments = Vec::with_capacity(columns.len());
    for (name, value) in columns {
        match metadata.column(name) {
            Some(column) if !column.primary_key => {}
            _ => {
                return Err(CoreError::invalid_operation(format!(
                    "cannot update column {name} of {}",
                    metadata.table_name()
                )))
            }
        }
        assignments.push(format!(
            "{} = {}",
            dialect.quote_identifier(name),
            binder.bind(value)
        ));
    }

    let condition = key_condition(&mut binder, metadata, key)?;
    let sql = format!(
        "UPDATE {} SET {} WHERE {condition}",
        dialect.quote_identifier(metadata.table_name()),
        assignments.join(", ")
    );
    Ok(binder.finish(sql))
}

/// Renders a DELETE of the row with `key`.
///
/// # Errors
///
/// Returns `MissingPrimaryKeyColumn` if the metadata has no single key.
pub fn delete_by_id(
    dialect: &dyn Dialect,
    metadata: &EntityMetadata,
    key: &PrimaryKey,
) -> CoreResult<Statement> {
    let mut binder = Binder::new(dialect);
    let condition = key_condition(&mut binder, metadata, key)?;
    let sql = format!(
        "DELETE FROM {} WHERE {condition}",
        dialect.quote_identifier(metadata.table_name())
    );
    Ok(binder.finish(sql))
}
