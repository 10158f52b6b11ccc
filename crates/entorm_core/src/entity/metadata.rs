//! Table and column descriptions for entity types.

use crate::error::{CoreError, CoreResult};

/// SQL column type, rendered per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer.
    BigInt,
    /// 32-bit integer.
    Integer,
    /// Bounded character string.
    Varchar(u32),
    /// Unbounded text.
    Text,
    /// Boolean flag.
    Boolean,
    /// Double precision float.
    Double,
}

/// How the primary-key value of a new entity is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationType {
    /// The caller assigns the key before persisting.
    #[default]
    Assigned,
    /// The database generates the key on insert.
    Identity,
}

/// Description of one mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name in the table.
    pub name: &'static str,
    /// SQL type.
    pub column_type: ColumnType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether this column is the primary key.
    pub primary_key: bool,
    /// Key generation strategy (meaningful on the primary key only).
    pub generation: GenerationType,
}

impl ColumnMetadata {
    /// A nullable, non-key column.
    #[must_use]
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
            primary_key: false,
            generation: GenerationType::Assigned,
        }
    }

    /// A primary-key column with a caller-assigned value.
    #[must_use]
    pub const fn id(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
            primary_key: true,
            generation: GenerationType::Assigned,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the key generation strategy.
    #[must_use]
    pub const fn generated(mut self, generation: GenerationType) -> Self {
        self.generation = generation;
        self
    }

    /// Whether the database assigns this column on insert.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.primary_key && matches!(self.generation, GenerationType::Identity)
    }
}

/// Mapping between an entity type and its table.
///
/// Column order is significant: `Entity::values` must produce values in
/// the same order.
///
/// # Example
///
/// ```
/// use entorm_core::{ColumnMetadata, ColumnType, EntityMetadata, GenerationType};
///
/// const USER_COLUMNS: &[ColumnMetadata] = &[
///     ColumnMetadata::id("id", ColumnType::BigInt).generated(GenerationType::Identity),
///     ColumnMetadata::new("nick_name", ColumnType::Varchar(64)).not_null(),
///     ColumnMetadata::new("age", ColumnType::Integer),
/// ];
///
/// static USERS: EntityMetadata = EntityMetadata::new("users", USER_COLUMNS);
///
/// assert_eq!(USERS.primary_key().unwrap().name, "id");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMetadata {
    table_name: &'static str,
    columns: &'static [ColumnMetadata],
}

impl EntityMetadata {
    /// Creates metadata for `table_name` with the given columns.
    #[must_use]
    pub const fn new(table_name: &'static str, columns: &'static [ColumnMetadata]) -> Self {
        Self {
            table_name,
            columns,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Returns all columns in declaration order.
    #[must_use]
    pub const fn columns(&self) -> &'static [ColumnMetadata] {
        self.columns
    }

    /// Returns the single primary-key column.
    ///
    /// # Errors
    ///
    /// Returns `MissingPrimaryKeyColumn` unless exactly one column is
    /// flagged as primary key.
    pub fn primary_key(&self) -> CoreResult<&'static ColumnMetadata> {
        let mut keys = self.columns.iter().filter(|c| c.primary_key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(key),
            _ => Err(CoreError::MissingPrimaryKeyColumn {
                table: self.table_name.to_string(),
                found: self.columns.iter().filter(|c| c.primary_key).count(),
            }),
        }
    }

    /// Returns the position of `name` in the column list.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the column named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&'static ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}
