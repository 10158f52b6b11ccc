//! Property-based test generators using proptest.
//!
//! Provides strategies for generating `Person` fixtures and keys.

use crate::fixtures::Person;
use entorm_core::{PrimaryKey, Value};
use proptest::prelude::*;

/// Strategy for generating nick names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_ ]{0,31}").expect("Invalid regex")
}

/// Strategy for generating email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-z][a-z0-9.]{0,15}").expect("Invalid regex"),
        prop::string::string_regex("[a-z]{1,10}").expect("Invalid regex"),
    )
        .prop_map(|(user, domain)| format!("{user}@{domain}.com"))
}

/// Strategy for generating a person with the given key.
pub fn person_with_id(id: i64) -> impl Strategy<Value = Person> {
    (
        name_strategy(),
        prop::option::of(0..120i32),
        email_strategy(),
    )
        .prop_map(move |(name, age, email)| Person {
            id: Some(id),
            name,
            age,
            email,
        })
}

/// Strategy for generating a person with a positive key.
pub fn person_strategy() -> impl Strategy<Value = Person> {
    (1..10_000i64).prop_flat_map(person_with_id)
}

/// Strategy for generating people with distinct keys `1..=len`.
pub fn people_strategy(max: usize) -> impl Strategy<Value = Vec<Person>> {
    (1..=max.max(1)).prop_flat_map(|len| {
        (1..=len as i64)
            .map(person_with_id)
            .collect::<Vec<_>>()
    })
}

/// Strategy for generating primary keys of either kind.
pub fn primary_key_strategy() -> impl Strategy<Value = PrimaryKey> {
    prop_oneof![
        any::<i64>().prop_map(PrimaryKey::Integer),
        "[a-z0-9-]{1,36}".prop_map(PrimaryKey::Text),
    ]
}

/// Strategy for generating column values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9..1.0e9f64).prop_map(Value::Real),
        name_strategy().prop_map(Value::Text),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_people_are_valid(person in person_strategy()) {
            prop_assert!(person.id.is_some_and(|id| id > 0));
            prop_assert!(!person.name.is_empty());
            prop_assert!(person.email.contains('@'));
        }

        #[test]
        fn people_have_distinct_keys(people in people_strategy(8)) {
            let mut ids: Vec<_> = people.iter().filter_map(|p| p.id).collect();
            ids.dedup();
            prop_assert_eq!(ids.len(), people.len());
        }
    }
}
