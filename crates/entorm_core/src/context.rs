//! First-level cache of a unit of work.

use crate::entity::{Entity, EntityId, EntityMetadata, ManagedEntity, PrimaryKey};
use crate::error::{CoreError, CoreResult};
use crate::snapshot::{DirtyColumn, EntitySnapshot};
use crate::value::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::trace;

/// A cached entity whose state differs from its snapshot.
#[derive(Debug, Clone)]
pub struct DirtyEntity {
    /// Identity of the entity.
    pub id: EntityId,
    /// Table description of the entity.
    pub metadata: &'static EntityMetadata,
    /// Changed non-key columns, in column order.
    pub changes: Vec<DirtyColumn>,
    /// All current column values, in column order.
    pub values: Vec<Value>,
}

/// Session-scoped identity map plus the snapshots used for dirty checking.
///
/// Every entry is addressed by an [`EntityId`] built from the entity's
/// Rust type and its primary key, so at most one cached entity and one
/// snapshot exist per identity. Nothing is ever evicted implicitly; the
/// context lives exactly as long as the session that owns it.
///
/// Absent entries are reported as `None`, never as errors.
///
/// # Example
///
/// ```rust,ignore
/// let mut context = PersistenceContext::new();
/// context.add_entity(1, person);
///
/// let cached: &Person = context.get_entity::<Person>(1).unwrap();
/// let again: &Person = context.get_entity::<Person>(1).unwrap();
/// assert!(std::ptr::eq(cached, again));
/// ```
#[derive(Default)]
pub struct PersistenceContext {
    entities: HashMap<EntityId, Box<dyn ManagedEntity>>,
    snapshots: HashMap<EntityId, EntitySnapshot>,
}

impl PersistenceContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached `T` with `key`, or `None` if it was never added.
    ///
    /// Repeated lookups return the same instance.
    #[must_use]
    pub fn get_entity<T: Entity>(&self, key: impl Into<PrimaryKey>) -> Option<&T> {
        self.entities
            .get(&EntityId::of::<T>(key))
            .and_then(|entity| entity.as_any().downcast_ref::<T>())
    }

    /// Mutable variant of [`get_entity`](Self::get_entity).
    ///
    /// Changes made through the returned reference are picked up by the
    /// next dirty check.
    pub fn get_entity_mut<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> Option<&mut T> {
        self.entities
            .get_mut(&EntityId::of::<T>(key))
            .and_then(|entity| entity.as_any_mut().downcast_mut::<T>())
    }

    /// Caches `entity` under `key`, replacing any previous entry.
    pub fn add_entity<T: Entity>(&mut self, key: impl Into<PrimaryKey>, entity: T) {
        let id = EntityId::of::<T>(key);
        trace!(%id, "caching entity");
        self.entities.insert(id, Box::new(entity));
    }

    /// Drops the cache entry for `entity`, derived from its own key.
    ///
    /// Returns whether an entry was removed. The snapshot is kept; see
    /// [`evict_snapshot`](Self::evict_snapshot).
    ///
    /// # Errors
    ///
    /// Returns `MissingIdentifier` if the entity has no key.
    pub fn remove_entity<T: Entity>(&mut self, entity: &T) -> CoreResult<bool> {
        let key = entity
            .primary_key()
            .ok_or_else(|| CoreError::missing_identifier(T::metadata().table_name()))?;
        let id = EntityId::of::<T>(key);
        trace!(%id, "evicting entity");
        Ok(self.entities.remove(&id).is_some())
    }

    /// Removes the cache entry for `key` and hands the entity back.
    pub fn detach<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> Option<T> {
        let id = EntityId::of::<T>(key);
        self.snapshots.remove(&id);
        self.entities
            .remove(&id)
            .and_then(|entity| entity.into_any().downcast::<T>().ok())
            .map(|entity| *entity)
    }

    /// Returns the snapshot for `key`, capturing it from `entity` first if
    /// none exists yet.
    ///
    /// A snapshot is captured at most once per identity; later changes to
    /// `entity` are not reflected in it.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` if a new snapshot cannot be captured.
    pub fn get_database_snapshot<T: Entity>(
        &mut self,
        key: impl Into<PrimaryKey>,
        entity: &T,
    ) -> CoreResult<&EntitySnapshot> {
        match self.snapshots.entry(EntityId::of::<T>(key)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                trace!(id = %entry.key(), "capturing snapshot");
                Ok(entry.insert(EntitySnapshot::from_entity(entity)?))
            }
        }
    }

    /// Returns the snapshot for `key` without creating one.
    #[must_use]
    pub fn get_cached_database_snapshot<T: Entity>(
        &self,
        key: impl Into<PrimaryKey>,
    ) -> Option<&EntitySnapshot> {
        self.snapshots.get(&EntityId::of::<T>(key))
    }

    /// Overwrites the snapshot for `key` with the current state of `entity`.
    ///
    /// Used once that state has been written to the database.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` if the snapshot cannot be captured.
    pub fn replace_snapshot<T: Entity>(
        &mut self,
        key: impl Into<PrimaryKey>,
        entity: &T,
    ) -> CoreResult<()> {
        let snapshot = EntitySnapshot::from_entity(entity)?;
        self.snapshots.insert(EntityId::of::<T>(key), snapshot);
        Ok(())
    }

    /// Removes and returns the snapshot for `key`.
    pub fn evict_snapshot<T: Entity>(
        &mut self,
        key: impl Into<PrimaryKey>,
    ) -> Option<EntitySnapshot> {
        self.snapshots.remove(&EntityId::of::<T>(key))
    }

    /// Whether a `T` with `key` is cached.
    #[must_use]
    pub fn contains<T: Entity>(&self, key: impl Into<PrimaryKey>) -> bool {
        self.entities.contains_key(&EntityId::of::<T>(key))
    }

    /// Number of cached entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Drops every cached entity and snapshot.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.snapshots.clear();
    }

    /// Iterates over all cached entities regardless of type.
    pub fn managed(&self) -> impl Iterator<Item = (&EntityId, &dyn ManagedEntity)> {
        self.entities
            .iter()
            .map(|(id, entity)| (id, entity.as_ref()))
    }

    /// Compares every cached entity with its snapshot.
    ///
    /// Returns the entities whose non-key columns changed. Entities without
    /// a snapshot are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` if an entity produces the wrong number
    /// of values.
    pub fn dirty_entities(&self) -> CoreResult<Vec<DirtyEntity>> {
        let mut dirty = Vec::new();
        for (id, entity) in &self.entities {
            let Some(snapshot) = self.snapshots.get(id) else {
                continue;
            };
            let changes = snapshot.dirty_columns(entity.as_ref())?;
            if !changes.is_empty() {
                dirty.push(DirtyEntity {
                    id: id.clone(),
                    metadata: entity.entity_metadata(),
                    changes,
                    values: entity.column_values(),
                });
            }
        }
        Ok(dirty)
    }

    /// Re-captures the snapshot of the cached entity `id` from its
    /// current state.
    ///
    /// Returns `false` if nothing is cached under `id`.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` if the snapshot cannot be captured.
    pub fn refresh_snapshot(&mut self, id: &EntityId) -> CoreResult<bool> {
        let Some(entity) = self.entities.get(id) else {
            return Ok(false);
        };
        let snapshot = EntitySnapshot::from_entity(entity.as_ref())?;
        self.snapshots.insert(id.clone(), snapshot);
        Ok(true)
    }
}

impl std::fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceContext")
            .field("entities", &self.entities.len())
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}
