//! Point-in-time copies of entity state for dirty checking.

use crate::entity::{EntityMetadata, ManagedEntity};
use crate::error::{CoreError, CoreResult};
use crate::value::Value;

/// The column values of an entity as they were when captured.
///
/// A snapshot never changes after capture. Comparing it with the live
/// entity tells the entity manager which columns need an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    metadata: &'static EntityMetadata,
    values: Vec<Value>,
}

/// A column whose current value differs from its snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyColumn {
    /// Column name.
    pub column: &'static str,
    /// Value recorded in the snapshot.
    pub old: Value,
    /// Current value.
    pub new: Value,
}

fn checked_values(entity: &dyn ManagedEntity) -> CoreResult<Vec<Value>> {
    let metadata = entity.entity_metadata();
    let values = entity.column_values();
    if values.len() != metadata.columns().len() {
        return Err(CoreError::ColumnCountMismatch {
            table: metadata.table_name().to_string(),
            expected: metadata.columns().len(),
            actual: values.len(),
        });
    }
    Ok(values)
}

impl EntitySnapshot {
    /// Captures the current column values of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` if the entity produces a different
    /// number of values than its metadata declares.
    pub fn from_entity(entity: &dyn ManagedEntity) -> CoreResult<Self> {
        Ok(Self {
            metadata: entity.entity_metadata(),
            values: checked_values(entity)?,
        })
    }

    /// Returns the table description of the captured entity.
    #[must_use]
    pub fn metadata(&self) -> &'static EntityMetadata {
        self.metadata
    }

    /// Returns the captured value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.metadata
            .column_index(column)
            .map(|i| &self.values[i])
    }

    /// Returns the captured values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Compares `current` against the snapshot.
    ///
    /// Returns the non-key columns whose value changed, in column order.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` if `current` produces the wrong number
    /// of values, or `InvalidOperation` if it maps to another table.
    pub fn dirty_columns(&self, current: &dyn ManagedEntity) -> CoreResult<Vec<DirtyColumn>> {
        let metadata = current.entity_metadata();
        if metadata != self.metadata {
            return Err(CoreError::invalid_operation(format!(
                "snapshot of {} compared with entity of {}",
                self.metadata.table_name(),
                metadata.table_name()
            )));
        }
        let values = checked_values(current)?;

        Ok(self
            .metadata
            .columns()
            .iter()
            .zip(self.values.iter().zip(values))
            .filter(|(column, (old, new))| !column.primary_key && !unchanged(old, new))
            .map(|(column, (old, new))| DirtyColumn {
                column: column.name,
                old: old.clone(),
                new,
            })
            .collect())
    }
}

// Floats compare by bit pattern so a NaN equals itself.
fn unchanged(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
        _ => old == new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColumnMetadata, ColumnType, Entity, PrimaryKey};
    use crate::executor::Row;

    struct Note {
        id: i64,
        body: String,
        pinned: bool,
    }

    const NOTE_COLUMNS: &[ColumnMetadata] = &[
        ColumnMetadata::id("id", ColumnType::BigInt),
        ColumnMetadata::new("body", ColumnType::Text),
        ColumnMetadata::new("pinned", ColumnType::Boolean),
    ];
    static NOTE: EntityMetadata = EntityMetadata::new("notes", NOTE_COLUMNS);

    impl Entity for Note {
        fn metadata() -> &'static EntityMetadata {
            &NOTE
        }

        fn primary_key(&self) -> Option<PrimaryKey> {
            Some(self.id.into())
        }

        fn values(&self) -> Vec<Value> {
            vec![self.id.into(), self.body.as_str().into(), self.pinned.into()]
        }

        fn from_row(row: &Row) -> CoreResult<Self> {
            Ok(Self {
                id: row.get("id")?,
                body: row.get("body")?,
                pinned: row.get("pinned")?,
            })
        }
    }

    struct Broken;

    impl Entity for Broken {
        fn metadata() -> &'static EntityMetadata {
            &NOTE
        }

        fn primary_key(&self) -> Option<PrimaryKey> {
            None
        }

        fn values(&self) -> Vec<Value> {
            vec![Value::Null]
        }

        fn from_row(_row: &Row) -> CoreResult<Self> {
            Ok(Broken)
        }
    }

    struct Reading {
        id: i64,
        celsius: f64,
    }

    const READING_COLUMNS: &[ColumnMetadata] = &[
        ColumnMetadata::id("id", ColumnType::BigInt),
        ColumnMetadata::new("celsius", ColumnType::Double),
    ];
    static READING: EntityMetadata = EntityMetadata::new("readings", READING_COLUMNS);

    impl Entity for Reading {
        fn metadata() -> &'static EntityMetadata {
            &READING
        }

        fn primary_key(&self) -> Option<PrimaryKey> {
            Some(self.id.into())
        }

        fn values(&self) -> Vec<Value> {
            vec![self.id.into(), self.celsius.into()]
        }

        fn from_row(row: &Row) -> CoreResult<Self> {
            Ok(Self {
                id: row.get("id")?,
                celsius: row.get("celsius")?,
            })
        }
    }

    #[test]
    fn nan_is_not_dirty_against_itself() {
        let mut reading = Reading {
            id: 1,
            celsius: f64::NAN,
        };
        let snapshot = EntitySnapshot::from_entity(&reading).unwrap();
        assert!(snapshot.dirty_columns(&reading).unwrap().is_empty());

        reading.celsius = 21.5;
        let dirty = snapshot.dirty_columns(&reading).unwrap();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].new, Value::Real(21.5));
    }

    #[test]
    fn clean_entity_has_no_dirty_columns() {
        let note = Note {
            id: 1,
            body: "hello".into(),
            pinned: false,
        };
        let snapshot = EntitySnapshot::from_entity(&note).unwrap();
        assert!(snapshot.dirty_columns(&note).unwrap().is_empty());
        assert_eq!(snapshot.get("body"), Some(&Value::Text("hello".into())));
    }

    #[test]
    fn changed_columns_are_reported_in_order() {
        let mut note = Note {
            id: 1,
            body: "hello".into(),
            pinned: false,
        };
        let snapshot = EntitySnapshot::from_entity(&note).unwrap();
        note.pinned = true;
        note.body = "bye".into();

        let dirty = snapshot.dirty_columns(&note).unwrap();
        let names: Vec<_> = dirty.iter().map(|d| d.column).collect();
        assert_eq!(names, vec!["body", "pinned"]);
        assert_eq!(dirty[1].old, Value::Bool(false));
        assert_eq!(dirty[1].new, Value::Bool(true));
    }

    #[test]
    fn key_changes_are_not_dirty() {
        let mut note = Note {
            id: 1,
            body: "hello".into(),
            pinned: false,
        };
        let snapshot = EntitySnapshot::from_entity(&note).unwrap();
        note.id = 2;
        assert!(snapshot.dirty_columns(&note).unwrap().is_empty());
    }

    #[test]
    fn value_count_is_checked() {
        let err = EntitySnapshot::from_entity(&Broken).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ColumnCountMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }
}
