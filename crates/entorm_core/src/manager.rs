//! Entity manager over a persistence context.

use crate::config::Config;
use crate::context::PersistenceContext;
use crate::entity::{Entity, EntityMetadata, PrimaryKey};
use crate::error::{CoreError, CoreResult};
use crate::executor::{Executor, Row};
use crate::sql::{dml, CreateTableBuilder, Dialect, DropTableBuilder, Statement};
use crate::value::Value;
use tracing::{debug, info, trace};

/// Persist / find / remove operations on entities.
pub trait EntityManager {
    /// Inserts or updates `entity` and returns the managed instance.
    ///
    /// # Errors
    ///
    /// Returns `MissingIdentifier` if the entity has no key and its key is
    /// not generated, or any driver error.
    fn persist<T: Entity>(&mut self, entity: T) -> CoreResult<&T>;

    /// Returns the `T` with `key`, loading it on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if no row exists, or any driver error.
    fn find<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> CoreResult<&T>;

    /// Deletes the row of `entity` and evicts it from the cache.
    ///
    /// # Errors
    ///
    /// Returns `MissingIdentifier` if the entity has no key, or any driver
    /// error.
    fn remove<T: Entity>(&mut self, entity: &T) -> CoreResult<()>;
}

/// One unit of work: an executor, a dialect and a persistence context.
///
/// Every entity loaded or persisted through a session is cached in its
/// context, so repeated lookups of the same identity return the same
/// instance and issue no SQL. Changes are detected by comparing cached
/// instances against the snapshot taken when they entered the context.
pub struct Session<X: Executor> {
    executor: X,
    dialect: Box<dyn Dialect>,
    context: PersistenceContext,
    config: Config,
}

impl<X: Executor> Session<X> {
    /// Creates a session with the default configuration.
    pub fn new(executor: X, dialect: impl Dialect + 'static) -> Self {
        Self::with_config(executor, dialect, Config::default())
    }

    /// Creates a session with an explicit configuration.
    pub fn with_config(executor: X, dialect: impl Dialect + 'static, config: Config) -> Self {
        Self {
            executor,
            dialect: Box::new(dialect),
            context: PersistenceContext::new(),
            config,
        }
    }

    /// Returns the persistence context.
    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the dialect.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the executor.
    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Returns the executor for statements outside the entity API.
    ///
    /// Writes made this way bypass the persistence context.
    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.executor
    }

    /// Ends the session and returns the executor.
    pub fn into_executor(self) -> X {
        self.executor
    }

    /// Creates the table of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is invalid or the driver fails.
    pub fn create_table<T: Entity>(&mut self) -> CoreResult<()> {
        let sql = CreateTableBuilder::new(self.dialect.as_ref(), T::metadata()).build()?;
        self.log_sql(&sql);
        self.executor.execute_batch(&sql)
    }

    /// Drops the table of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn drop_table<T: Entity>(&mut self) -> CoreResult<()> {
        let sql = DropTableBuilder::new(self.dialect.as_ref(), T::metadata()).build();
        self.log_sql(&sql);
        self.executor.execute_batch(&sql)
    }

    /// Like [`find`](EntityManager::find) but returns `None` when no row
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns any driver or hydration error.
    pub fn find_optional<T: Entity>(
        &mut self,
        key: impl Into<PrimaryKey>,
    ) -> CoreResult<Option<&T>> {
        match self.ensure_loaded::<T>(&key.into())? {
            Some(key) => Ok(self.context.get_entity::<T>(key)),
            None => Ok(None),
        }
    }

    /// Like [`find`](EntityManager::find) but returns a mutable reference.
    ///
    /// Changes are written by the next [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if no row exists, or any driver error.
    pub fn find_mut<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> CoreResult<&mut T> {
        let requested = key.into();
        let Some(key) = self.ensure_loaded::<T>(&requested)? else {
            return Err(CoreError::not_found(T::metadata().table_name(), &requested));
        };
        self.context
            .get_entity_mut::<T>(key.clone())
            .ok_or_else(|| CoreError::not_found(T::metadata().table_name(), &key))
    }

    /// Loads every row of `T`'s table.
    ///
    /// Rows whose identity is already cached keep the cached instance.
    ///
    /// # Errors
    ///
    /// Returns any driver or hydration error.
    pub fn find_all<T: Entity>(&mut self) -> CoreResult<Vec<&T>> {
        let statement = dml::select_all(self.dialect.as_ref(), T::metadata());
        let rows = self.query(&statement)?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            let entity = T::from_row(row)?;
            let key = entity
                .primary_key()
                .ok_or_else(|| CoreError::missing_identifier(T::metadata().table_name()))?;
            if !self.context.contains::<T>(key.clone()) {
                self.manage(key.clone(), entity)?;
            }
            keys.push(key);
        }

        Ok(keys
            .into_iter()
            .filter_map(|key| self.context.get_entity::<T>(key))
            .collect())
    }

    /// Deletes the row of `T` with `key` and evicts it from the cache.
    ///
    /// Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns any driver error.
    pub fn remove_by_id<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> CoreResult<bool> {
        let key = key.into();
        let statement = dml::delete_by_id(self.dialect.as_ref(), T::metadata(), &key)?;
        let affected = self.execute(&statement)?;
        self.context.detach::<T>(key.clone());
        debug!(table = T::metadata().table_name(), %key, affected, "removed entity");
        Ok(affected > 0)
    }

    /// Writes every modified cached entity to the database.
    ///
    /// Returns the number of UPDATE statements issued.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the row of a modified entity no longer
    /// exists, or any driver error. Entities flushed before the failure
    /// keep their refreshed snapshots.
    pub fn flush(&mut self) -> CoreResult<usize> {
        let dirty = self.context.dirty_entities()?;
        let mut issued = 0;

        for entity in dirty {
            let columns = if self.config.dynamic_update {
                entity
                    .changes
                    .into_iter()
                    .map(|change| (change.column, change.new))
                    .collect()
            } else {
                non_key_columns(entity.metadata, entity.values)
            };
            let statement = dml::update_columns(
                self.dialect.as_ref(),
                entity.metadata,
                columns,
                entity.id.key(),
            )?;
            if self.execute(&statement)? == 0 {
                return Err(CoreError::not_found(
                    entity.metadata.table_name(),
                    entity.id.key(),
                ));
            }
            self.context.refresh_snapshot(&entity.id)?;
            issued += 1;
        }

        debug!(issued, "flush complete");
        Ok(issued)
    }

    /// Evicts the `T` with `key` from the cache without touching the
    /// database and returns it.
    pub fn detach<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> Option<T> {
        self.context.detach::<T>(key)
    }

    /// Evicts every cached entity. Unflushed changes are lost.
    pub fn clear(&mut self) {
        self.context.clear();
    }

    /// Makes sure the `T` with `key` is cached, loading it if needed.
    ///
    /// A loaded row is cached under the key it reports itself, so lookups
    /// by differently typed keys of one row share a single instance.
    /// Returns the key the entity is cached under, or `None` if no such
    /// row exists.
    fn ensure_loaded<T: Entity>(&mut self, key: &PrimaryKey) -> CoreResult<Option<PrimaryKey>> {
        if self.context.contains::<T>(key.clone()) {
            debug!(table = T::metadata().table_name(), %key, "first-level cache hit");
            return Ok(Some(key.clone()));
        }

        debug!(table = T::metadata().table_name(), %key, "first-level cache miss");
        let Some(entity) = self.load::<T>(key)? else {
            return Ok(None);
        };
        let managed_key = entity.primary_key().unwrap_or_else(|| key.clone());
        if self.context.contains::<T>(managed_key.clone()) {
            debug!(table = T::metadata().table_name(), %managed_key, "row already cached");
        } else {
            self.manage(managed_key.clone(), entity)?;
        }
        Ok(Some(managed_key))
    }

    fn load<T: Entity>(&mut self, key: &PrimaryKey) -> CoreResult<Option<T>> {
        let statement = dml::select_by_id(self.dialect.as_ref(), T::metadata(), key)?;
        let rows = self.query(&statement)?;
        rows.first().map(T::from_row).transpose()
    }

    /// Caches `entity` and captures its snapshot.
    fn manage<T: Entity>(&mut self, key: PrimaryKey, entity: T) -> CoreResult<()> {
        self.context.get_database_snapshot(key.clone(), &entity)?;
        self.context.add_entity(key, entity);
        Ok(())
    }

    fn cached<T: Entity>(&self, key: PrimaryKey) -> CoreResult<&T> {
        self.context
            .get_entity::<T>(key.clone())
            .ok_or_else(|| CoreError::not_found(T::metadata().table_name(), &key))
    }

    fn insert<T: Entity>(&mut self, entity: &T) -> CoreResult<()> {
        let statement = dml::insert(self.dialect.as_ref(), T::metadata(), entity.values())?;
        self.execute(&statement)?;
        Ok(())
    }

    fn insert_generated<T: Entity>(&mut self, mut entity: T) -> CoreResult<&T> {
        self.insert(&entity)?;
        let key = PrimaryKey::Integer(self.executor.last_insert_id()?);
        entity.set_primary_key(key.clone())?;
        debug!(table = T::metadata().table_name(), %key, "inserted entity with generated key");
        self.manage(key.clone(), entity)?;
        self.cached(key)
    }

    /// Issues an UPDATE for the differences between `entity` and the
    /// snapshot of `key`. Returns whether a statement was issued.
    ///
    /// An UPDATE that matches no row means the row was deleted outside
    /// the session and fails with `EntityNotFound`.
    fn update<T: Entity>(&mut self, key: &PrimaryKey, entity: &T) -> CoreResult<bool> {
        let metadata = T::metadata();
        let changes = match self.context.get_cached_database_snapshot::<T>(key.clone()) {
            Some(snapshot) => snapshot.dirty_columns(entity)?,
            None => {
                return Err(CoreError::invalid_operation(format!(
                    "no snapshot for {} {key}",
                    metadata.table_name()
                )))
            }
        };

        if changes.is_empty() {
            debug!(table = metadata.table_name(), %key, "entity unchanged, skipping update");
            return Ok(false);
        }

        let columns = if self.config.dynamic_update {
            changes
                .into_iter()
                .map(|change| (change.column, change.new))
                .collect()
        } else {
            non_key_columns(metadata, entity.values())
        };
        let statement = dml::update_columns(self.dialect.as_ref(), metadata, columns, key)?;
        if self.execute(&statement)? == 0 {
            return Err(CoreError::not_found(metadata.table_name(), key));
        }
        debug!(table = metadata.table_name(), %key, "updated entity");
        Ok(true)
    }

    fn execute(&mut self, statement: &Statement) -> CoreResult<u64> {
        self.log_statement(statement);
        self.executor.execute(statement)
    }

    fn query(&mut self, statement: &Statement) -> CoreResult<Vec<Row>> {
        self.log_statement(statement);
        self.executor.query(statement)
    }

    fn log_statement(&self, statement: &Statement) {
        if self.config.show_sql {
            info!(dialect = self.dialect.name(), %statement, "sql");
        } else {
            trace!(dialect = self.dialect.name(), %statement, "sql");
        }
    }

    fn log_sql(&self, sql: &str) {
        if self.config.show_sql {
            info!(dialect = self.dialect.name(), statement = sql, "sql");
        } else {
            trace!(dialect = self.dialect.name(), statement = sql, "sql");
        }
    }
}

impl<X: Executor> EntityManager for Session<X> {
    fn persist<T: Entity>(&mut self, entity: T) -> CoreResult<&T> {
        let metadata = T::metadata();
        let key_column = metadata.primary_key()?;

        let key = match entity.primary_key() {
            Some(key) => key,
            None if key_column.is_identity() => return self.insert_generated(entity),
            None => return Err(CoreError::missing_identifier(metadata.table_name())),
        };

        let Some(managed_key) = self.ensure_loaded::<T>(&key)? else {
            self.insert(&entity)?;
            debug!(table = metadata.table_name(), %key, "inserted entity");
            self.manage(key.clone(), entity)?;
            return self.cached(key);
        };

        if self.update(&managed_key, &entity)? {
            self.context.replace_snapshot(managed_key.clone(), &entity)?;
        }
        self.context.add_entity(managed_key.clone(), entity);
        self.cached(managed_key)
    }

    fn find<T: Entity>(&mut self, key: impl Into<PrimaryKey>) -> CoreResult<&T> {
        let requested = key.into();
        match self.ensure_loaded::<T>(&requested)? {
            Some(key) => self.cached(key),
            None => Err(CoreError::not_found(T::metadata().table_name(), &requested)),
        }
    }

    fn remove<T: Entity>(&mut self, entity: &T) -> CoreResult<()> {
        let key = entity
            .primary_key()
            .ok_or_else(|| CoreError::missing_identifier(T::metadata().table_name()))?;
        let statement = dml::delete_by_id(self.dialect.as_ref(), T::metadata(), &key)?;
        let affected = self.execute(&statement)?;

        self.context.remove_entity(entity)?;
        self.context.evict_snapshot::<T>(key.clone());
        debug!(table = T::metadata().table_name(), %key, affected, "removed entity");
        Ok(())
    }
}

impl<X: Executor> std::fmt::Debug for Session<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect.name())
            .field("context", &self.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn non_key_columns(
    metadata: &'static EntityMetadata,
    values: Vec<Value>,
) -> Vec<(&'static str, Value)> {
    metadata
        .columns()
        .iter()
        .zip(values)
        .filter(|(column, _)| !column.primary_key)
        .map(|(column, value)| (column.name, value))
        .collect()
}
