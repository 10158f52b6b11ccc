//! Property tests for caching and dirty checking against SQLite.

use entorm_core::{EntityManager, Value};
use entorm_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn persisted_people_are_found(people in people_strategy(6)) {
        with_session(|session| {
            for person in &people {
                session.persist(person.clone()).unwrap();
            }
            session.clear();

            for person in &people {
                let found = session.find::<Person>(person.id.unwrap()).unwrap();
                prop_assert_eq!(found, person);
            }
            prop_assert_eq!(session.context().len(), people.len());
            Ok(())
        })?;
    }

    #[test]
    fn snapshot_tracks_last_persisted_state(
        original in person_with_id(1),
        changed in person_with_id(1),
    ) {
        with_session(|session| {
            session.persist(original.clone()).unwrap();
            session.persist(changed.clone()).unwrap();

            let snapshot = session
                .context()
                .get_cached_database_snapshot::<Person>(1i64)
                .unwrap();
            prop_assert_eq!(snapshot.get("nick_name"), Some(&Value::from(changed.name.as_str())));
            prop_assert_eq!(snapshot.get("email"), Some(&Value::from(changed.email.as_str())));
            prop_assert_eq!(session.flush().unwrap(), 0);

            session.clear();
            let reloaded = session.find::<Person>(1i64).unwrap();
            prop_assert_eq!(reloaded, &changed);
            Ok(())
        })?;
    }

    #[test]
    fn flush_persists_in_place_edits(person in person_strategy(), age in 0..120i32) {
        let id = person.id.unwrap();
        with_session(|session| {
            session.persist(person.clone()).unwrap();
            session.find_mut::<Person>(id).unwrap().age = Some(age);

            let expected = usize::from(person.age != Some(age));
            prop_assert_eq!(session.flush().unwrap(), expected);

            session.clear();
            prop_assert_eq!(session.find::<Person>(id).unwrap().age, Some(age));
            Ok(())
        })?;
    }
}
