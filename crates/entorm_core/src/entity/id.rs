//! Entity identity.

use crate::value::Value;
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Primary-key value of an entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimaryKey {
    /// Integer key (including database-generated identities).
    Integer(i64),
    /// Text key.
    Text(String),
}

impl PrimaryKey {
    /// Converts the key into a column value for statement parameters.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            PrimaryKey::Integer(n) => Value::Integer(*n),
            PrimaryKey::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Builds a key from a column value.
    ///
    /// Returns `None` for NULL, booleans and floats.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(PrimaryKey::Integer(*n)),
            Value::Text(s) => Some(PrimaryKey::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKey::Integer(n) => write!(f, "{n}"),
            PrimaryKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(value: i64) -> Self {
        PrimaryKey::Integer(value)
    }
}

impl From<i32> for PrimaryKey {
    fn from(value: i32) -> Self {
        PrimaryKey::Integer(i64::from(value))
    }
}

impl From<String> for PrimaryKey {
    fn from(value: String) -> Self {
        PrimaryKey::Text(value)
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        PrimaryKey::Text(value.to_string())
    }
}

impl From<Uuid> for PrimaryKey {
    fn from(value: Uuid) -> Self {
        PrimaryKey::Text(value.hyphenated().to_string())
    }
}

impl From<PrimaryKey> for Value {
    fn from(key: PrimaryKey) -> Self {
        match key {
            PrimaryKey::Integer(n) => Value::Integer(n),
            PrimaryKey::Text(s) => Value::Text(s),
        }
    }
}

/// The Rust type of an entity.
///
/// Equality and hashing use only the `TypeId`; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
}

impl EntityType {
    /// Returns the entity type of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the fully qualified Rust type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

/// Identity of an entity within a persistence context.
///
/// Composite of the entity type and its primary-key value. Two entities
/// of different types never share an identity even when their keys are
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    entity_type: EntityType,
    key: PrimaryKey,
}

impl EntityId {
    /// Creates the identity of the `T` entity with the given key.
    #[must_use]
    pub fn of<T: 'static>(key: impl Into<PrimaryKey>) -> Self {
        Self {
            entity_type: EntityType::of::<T>(),
            key: key.into(),
        }
    }

    /// Returns the entity type.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the primary-key value.
    #[must_use]
    pub fn key(&self) -> &PrimaryKey {
        &self.key
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type.short_name(), self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Person;
    struct Order;

    #[test]
    fn same_type_and_key_are_equal() {
        assert_eq!(EntityId::of::<Person>(1), EntityId::of::<Person>(1i64));
    }

    #[test]
    fn type_participates_in_identity() {
        let mut set = HashSet::new();
        set.insert(EntityId::of::<Person>(1));
        set.insert(EntityId::of::<Order>(1));
        set.insert(EntityId::of::<Person>(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn key_kinds_are_distinct() {
        assert_ne!(EntityId::of::<Person>(1), EntityId::of::<Person>("1"));
    }

    #[test]
    fn display() {
        assert_eq!(EntityId::of::<Person>(42).to_string(), "Person#42");
    }

    #[test]
    fn uuid_keys_are_text() {
        let uuid = Uuid::new_v4();
        let key = PrimaryKey::from(uuid);
        assert_eq!(key, PrimaryKey::Text(uuid.to_string()));
    }

    #[test]
    fn value_conversion() {
        let key = PrimaryKey::Integer(5);
        assert_eq!(PrimaryKey::from_value(&key.to_value()), Some(key));
        assert_eq!(PrimaryKey::from_value(&Value::Null), None);
    }
}
