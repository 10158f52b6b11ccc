//! Database-specific SQL syntax.

use crate::entity::ColumnType;

/// Database-specific parts of generated SQL.
pub trait Dialect {
    /// Human-readable dialect name.
    fn name(&self) -> &'static str;

    /// Renders a column type.
    fn type_name(&self, column_type: ColumnType) -> String;

    /// Quotes an identifier (table or column name).
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Renders the placeholder of the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Renders an identity (database-generated) primary-key column.
    ///
    /// `type_name` is the already rendered column type.
    fn identity_column(&self, type_name: &str) -> String;

    /// Whether `CREATE TABLE IF NOT EXISTS` / `DROP TABLE IF EXISTS` are
    /// understood.
    fn supports_if_exists(&self) -> bool {
        true
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_name(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::BigInt | ColumnType::Integer | ColumnType::Boolean => "INTEGER".into(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".into(),
            ColumnType::Double => "REAL".into(),
        }
    }

    // Only an INTEGER PRIMARY KEY aliases the rowid
    fn identity_column(&self, _type_name: &str) -> String {
        "INTEGER PRIMARY KEY AUTOINCREMENT".into()
    }
}

/// H2.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Dialect;

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn type_name(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::BigInt => "BIGINT".into(),
            ColumnType::Integer => "INT".into(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "CLOB".into(),
            ColumnType::Boolean => "BOOLEAN".into(),
            ColumnType::Double => "DOUBLE".into(),
        }
    }

    fn identity_column(&self, type_name: &str) -> String {
        format!("{type_name} AUTO_INCREMENT PRIMARY KEY")
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn type_name(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::BigInt => "BIGINT".into(),
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".into(),
            ColumnType::Boolean => "BOOLEAN".into(),
            ColumnType::Double => "DOUBLE PRECISION".into(),
        }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn identity_column(&self, type_name: &str) -> String {
        format!("{type_name} GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY")
    }
}
