//! CREATE TABLE / DROP TABLE generation.

use crate::entity::{ColumnMetadata, EntityMetadata};
use crate::error::CoreResult;
use crate::sql::Dialect;

/// Builds a `CREATE TABLE` statement for an entity.
///
/// # Example
///
/// ```
/// use entorm_core::sql::{CreateTableBuilder, SqliteDialect};
/// use entorm_core::{ColumnMetadata, ColumnType, EntityMetadata};
///
/// const COLUMNS: &[ColumnMetadata] = &[
///     ColumnMetadata::id("id", ColumnType::BigInt),
///     ColumnMetadata::new("title", ColumnType::Text).not_null(),
/// ];
/// static BOOKS: EntityMetadata = EntityMetadata::new("books", COLUMNS);
///
/// let sql = CreateTableBuilder::new(&SqliteDialect, &BOOKS).build().unwrap();
/// assert_eq!(
///     sql,
///     "CREATE TABLE \"books\" (\"id\" INTEGER NOT NULL PRIMARY KEY, \"title\" TEXT NOT NULL)"
/// );
/// ```
pub struct CreateTableBuilder<'a> {
    dialect: &'a dyn Dialect,
    metadata: &'a EntityMetadata,
    if_not_exists: bool,
}

impl<'a> CreateTableBuilder<'a> {
    /// Creates a builder for `metadata` in `dialect`.
    pub fn new(dialect: &'a dyn Dialect, metadata: &'a EntityMetadata) -> Self {
        Self {
            dialect,
            metadata,
            if_not_exists: false,
        }
    }

    /// Adds `IF NOT EXISTS` when the dialect supports it.
    #[must_use]
    pub fn if_not_exists(mut self, value: bool) -> Self {
        self.if_not_exists = value;
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns `MissingPrimaryKeyColumn` if the metadata has no single key.
    pub fn build(&self) -> CoreResult<String> {
        self.metadata.primary_key()?;

        let columns: Vec<String> = self
            .metadata
            .columns()
            .iter()
            .map(|column| self.column_definition(column))
            .collect();

        let guard = if self.if_not_exists && self.dialect.supports_if_exists() {
            "IF NOT EXISTS "
        } else {
            ""
        };

        Ok(format!(
            "CREATE TABLE {guard}{} ({})",
            self.dialect.quote_identifier(self.metadata.table_name()),
            columns.join(", ")
        ))
    }

    fn column_definition(&self, column: &ColumnMetadata) -> String {
        let name = self.dialect.quote_identifier(column.name);
        let type_name = self.dialect.type_name(column.column_type);

        if column.is_identity() {
            return format!("{name} {}", self.dialect.identity_column(&type_name));
        }

        let mut definition = format!("{name} {type_name}");
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        if column.primary_key {
            definition.push_str(" PRIMARY KEY");
        }
        definition
    }
}

/// Builds a `DROP TABLE` statement for an entity.
pub struct DropTableBuilder<'a> {
    dialect: &'a dyn Dialect,
    metadata: &'a EntityMetadata,
    if_exists: bool,
}

impl<'a> DropTableBuilder<'a> {
    /// Creates a builder for `metadata` in `dialect`.
    pub fn new(dialect: &'a dyn Dialect, metadata: &'a EntityMetadata) -> Self {
        Self {
            dialect,
            metadata,
            if_exists: false,
        }
    }

    /// Adds `IF EXISTS` when the dialect supports it.
    #[must_use]
    pub fn if_exists(mut self, value: bool) -> Self {
        self.if_exists = value;
        self
    }

    /// Renders the statement.
    #[must_use]
    pub fn build(&self) -> String {
        let guard = if self.if_exists && self.dialect.supports_if_exists() {
            "IF EXISTS "
        } else {
            ""
        };
        format!(
            "DROP TABLE {guard}{}",
            self.dialect.quote_identifier(self.metadata.table_name())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColumnType, GenerationType};
    use crate::sql::{H2Dialect, PostgresDialect, SqliteDialect};

    const PERSON_COLUMNS: &[ColumnMetadata] = &[
        ColumnMetadata::id("id", ColumnType::BigInt).generated(GenerationType::Identity),
        ColumnMetadata::new("nick_name", ColumnType::Varchar(255)).not_null(),
        ColumnMetadata::new("old", ColumnType::Integer),
        ColumnMetadata::new("email", ColumnType::Varchar(255)).not_null(),
    ];
    static PERSON: EntityMetadata = EntityMetadata::new("users", PERSON_COLUMNS);

    const KEYLESS_COLUMNS: &[ColumnMetadata] = &[ColumnMetadata::new("x", ColumnType::Text)];
    static KEYLESS: EntityMetadata = EntityMetadata::new("keyless", KEYLESS_COLUMNS);

    #[test]
    fn create_h2() {
        let sql = CreateTableBuilder::new(&H2Dialect, &PERSON).build().unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"users\" (\"id\" BIGINT AUTO_INCREMENT PRIMARY KEY, \
             \"nick_name\" VARCHAR(255) NOT NULL, \"old\" INT, \"email\" VARCHAR(255) NOT NULL)"
        );
    }

    #[test]
    fn create_sqlite_if_not_exists() {
        let sql = CreateTableBuilder::new(&SqliteDialect, &PERSON)
            .if_not_exists(true)
            .build()
            .unwrap();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"users\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
    }

    #[test]
    fn create_postgres_identity() {
        let sql = CreateTableBuilder::new(&PostgresDialect, &PERSON)
            .build()
            .unwrap();
        assert!(sql.contains("\"id\" BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"));
    }

    #[test]
    fn create_requires_primary_key() {
        assert!(CreateTableBuilder::new(&SqliteDialect, &KEYLESS)
            .build()
            .is_err());
    }

    #[test]
    fn drop_table() {
        assert_eq!(
            DropTableBuilder::new(&H2Dialect, &PERSON).build(),
            "DROP TABLE \"users\""
        );
        assert_eq!(
            DropTableBuilder::new(&SqliteDialect, &PERSON)
                .if_exists(true)
                .build(),
            "DROP TABLE IF EXISTS \"users\""
        );
    }
}
