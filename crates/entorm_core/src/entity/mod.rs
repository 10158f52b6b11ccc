//! Entity types, identity and table mapping.

mod id;
mod metadata;

pub use id::{EntityId, EntityType, PrimaryKey};
pub use metadata::{ColumnMetadata, ColumnType, EntityMetadata, GenerationType};

use crate::error::{CoreError, CoreResult};
use crate::executor::Row;
use crate::value::Value;
use std::any::Any;

/// Trait for types that can be mapped to a table row.
///
/// Implementors must provide:
/// - `metadata()`: the static table description
/// - `primary_key()` / `set_primary_key()`: access to the key column
/// - `values()`: current column values, in metadata column order
/// - `from_row()`: hydration from a selected row
///
/// # Example
///
/// ```rust
/// use entorm_core::{
///     ColumnMetadata, ColumnType, CoreResult, Entity, EntityMetadata, PrimaryKey, Row, Value,
/// };
///
/// struct Tag {
///     name: String,
///     color: Option<String>,
/// }
///
/// const TAG_COLUMNS: &[ColumnMetadata] = &[
///     ColumnMetadata::id("name", ColumnType::Varchar(32)),
///     ColumnMetadata::new("color", ColumnType::Varchar(16)),
/// ];
/// static TAG: EntityMetadata = EntityMetadata::new("tags", TAG_COLUMNS);
///
/// impl Entity for Tag {
///     fn metadata() -> &'static EntityMetadata {
///         &TAG
///     }
///
///     fn primary_key(&self) -> Option<PrimaryKey> {
///         Some(PrimaryKey::from(self.name.as_str()))
///     }
///
///     fn values(&self) -> Vec<Value> {
///         vec![self.name.as_str().into(), self.color.clone().into()]
///     }
///
///     fn from_row(row: &Row) -> CoreResult<Self> {
///         Ok(Tag {
///             name: row.get("name")?,
///             color: row.get("color")?,
///         })
///     }
/// }
/// ```
pub trait Entity: Any + Sized {
    /// Returns the table description for this type.
    fn metadata() -> &'static EntityMetadata;

    /// Returns the current primary-key value, `None` while unassigned.
    fn primary_key(&self) -> Option<PrimaryKey>;

    /// Assigns a database-generated key.
    ///
    /// Only called for `GenerationType::Identity` keys. The default
    /// implementation rejects the assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be stored in this entity.
    fn set_primary_key(&mut self, key: PrimaryKey) -> CoreResult<()> {
        Err(CoreError::invalid_operation(format!(
            "{} does not accept generated key {key}",
            Self::metadata().table_name()
        )))
    }

    /// Returns the current column values in metadata column order.
    fn values(&self) -> Vec<Value>;

    /// Builds an entity from a selected row.
    ///
    /// # Errors
    ///
    /// Returns an error if a column is missing or has the wrong type.
    fn from_row(row: &Row) -> CoreResult<Self>;
}

/// Object-safe view of an entity held by a persistence context.
///
/// Lets the context hold entities of different types side by side and
/// still snapshot and flush them.
pub trait ManagedEntity: Any {
    /// Returns the table description of the underlying type.
    fn entity_metadata(&self) -> &'static EntityMetadata;

    /// Returns the current column values.
    fn column_values(&self) -> Vec<Value>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Owned upcast for taking the concrete value back out.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Entity> ManagedEntity for T {
    fn entity_metadata(&self) -> &'static EntityMetadata {
        T::metadata()
    }

    fn column_values(&self) -> Vec<Value> {
        self.values()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
