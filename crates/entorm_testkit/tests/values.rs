//! Property tests for identity keys and column values.

use entorm_core::sql::Statement;
use entorm_core::{EntityId, Executor, PrimaryKey, Value};
use entorm_sqlite::SqliteExecutor;
use entorm_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

// Booleans have no storage class of their own in SQLite.
fn stored(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Integer(i64::from(*b)),
        other => other.clone(),
    }
}

proptest! {
    #[test]
    fn entity_ids_match_exactly_when_keys_match(
        a in primary_key_strategy(),
        b in primary_key_strategy(),
    ) {
        let left = EntityId::of::<Person>(a.clone());
        let right = EntityId::of::<Person>(b.clone());
        prop_assert_eq!(left == right, a == b);

        let set: HashSet<_> = [left, right].into_iter().collect();
        prop_assert_eq!(set.len(), if a == b { 1 } else { 2 });
    }

    #[test]
    fn integer_and_text_keys_never_collide(n in any::<i64>()) {
        prop_assert_ne!(
            EntityId::of::<Person>(n),
            EntityId::of::<Person>(n.to_string())
        );
    }

    #[test]
    fn primary_keys_survive_value_conversion(key in primary_key_strategy()) {
        prop_assert_eq!(PrimaryKey::from_value(&key.to_value()), Some(key));
    }

    #[test]
    fn sqlite_stores_and_returns_values(values in prop::collection::vec(value_strategy(), 1..16)) {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .execute_batch("CREATE TABLE cells (pos INTEGER PRIMARY KEY, v)")
            .unwrap();

        for (pos, value) in values.iter().enumerate() {
            executor
                .execute(&Statement {
                    sql: "INSERT INTO cells (pos, v) VALUES (?, ?)".into(),
                    params: vec![Value::Integer(pos as i64), value.clone()],
                })
                .unwrap();
        }

        let rows = executor
            .query(&Statement::new("SELECT v FROM cells ORDER BY pos"))
            .unwrap();
        prop_assert_eq!(rows.len(), values.len());
        for (row, value) in rows.iter().zip(&values) {
            prop_assert_eq!(row.value("v").unwrap(), &stored(value));
        }
    }
}
