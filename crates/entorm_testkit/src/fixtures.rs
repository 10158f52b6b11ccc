//! Test fixtures and session helpers.
//!
//! Provides the `Person` entity used across the test suites and
//! temporary SQLite sessions with its table already created.

use entorm_core::{
    ColumnMetadata, ColumnType, Config, CoreError, CoreResult, Entity, EntityMetadata,
    GenerationType, PrimaryKey, Row, Value,
};
use entorm_sqlite::{open_session_with, SqliteConfig, SqliteSession};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A person row in the `users` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    /// Generated key.
    pub id: Option<i64>,
    /// Stored in `nick_name`.
    pub name: String,
    /// Stored in `old`.
    pub age: Option<i32>,
    /// Required.
    pub email: String,
}

const PERSON_COLUMNS: &[ColumnMetadata] = &[
    ColumnMetadata::id("id", ColumnType::BigInt).generated(GenerationType::Identity),
    ColumnMetadata::new("nick_name", ColumnType::Varchar(255)),
    ColumnMetadata::new("old", ColumnType::Integer),
    ColumnMetadata::new("email", ColumnType::Varchar(255)).not_null(),
];

static PERSON: EntityMetadata = EntityMetadata::new("users", PERSON_COLUMNS);

impl Person {
    /// Creates a person with an assigned key.
    pub fn of(id: i64, name: &str, age: i32, email: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            age: Some(age),
            email: email.to_string(),
        }
    }

    /// Creates a person whose key the database generates.
    pub fn unsaved(name: &str, age: i32, email: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            age: Some(age),
            email: email.to_string(),
        }
    }
}

impl Entity for Person {
    fn metadata() -> &'static EntityMetadata {
        &PERSON
    }

    fn primary_key(&self) -> Option<PrimaryKey> {
        self.id.map(PrimaryKey::from)
    }

    fn set_primary_key(&mut self, key: PrimaryKey) -> CoreResult<()> {
        match key {
            PrimaryKey::Integer(id) => {
                self.id = Some(id);
                Ok(())
            }
            PrimaryKey::Text(text) => Err(CoreError::invalid_operation(format!(
                "users key must be an integer, got '{text}'"
            ))),
        }
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.age.into(),
            self.email.as_str().into(),
        ]
    }

    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("nick_name")?,
            age: row.get("old")?,
            email: row.get("email")?,
        })
    }
}

/// A SQLite session with the `users` table created.
pub struct TestSession {
    /// The session.
    pub session: SqliteSession,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestSession {
    /// Creates a session on a private in-memory database.
    pub fn memory() -> Self {
        Self::memory_with(Config::default())
    }

    /// Creates an in-memory session with a custom session configuration.
    pub fn memory_with(config: Config) -> Self {
        let session =
            open_session_with(&SqliteConfig::new(), config).expect("Failed to open session");
        Self::prepared(session, None)
    }

    /// Creates a session on a database file in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.db");
        let session = open_session_with(&SqliteConfig::file(&path), Config::default())
            .expect("Failed to open file session");
        Self::prepared(session, Some(temp_dir))
    }

    fn prepared(mut session: SqliteSession, temp_dir: Option<TempDir>) -> Self {
        session
            .create_table::<Person>()
            .expect("Failed to create users table");
        Self { session, temp_dir }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join("test.db"))
    }

    /// Starts a fresh session on the same database file.
    ///
    /// Returns `None` for in-memory sessions, whose data is private to
    /// the original connection.
    pub fn reopen(&self) -> Option<SqliteSession> {
        let path = self.path()?;
        let session = open_session_with(&SqliteConfig::file(path), Config::default())
            .expect("Failed to reopen session");
        Some(session)
    }
}

impl std::ops::Deref for TestSession {
    type Target = SqliteSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl std::ops::DerefMut for TestSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}

/// Runs a test with a temporary in-memory session.
///
/// # Example
///
/// ```rust,ignore
/// use entorm_testkit::prelude::*;
///
/// #[test]
/// fn my_test() {
///     with_session(|session| {
///         session.persist(Person::of(1, "kim", 30, "kim@example.com")).unwrap();
///     });
/// }
/// ```
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&mut SqliteSession) -> R,
{
    let mut test_session = TestSession::memory();
    f(&mut test_session.session)
}

/// Runs a test with a temporary file-based session.
pub fn with_file_session<F, R>(f: F) -> R
where
    F: FnOnce(&mut SqliteSession, &Path) -> R,
{
    let mut test_session = TestSession::file();
    let path = test_session
        .path()
        .expect("File session should have a path");
    f(&mut test_session.session, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entorm_core::EntityManager;

    #[test]
    fn person_values_follow_column_order() {
        let person = Person::of(1, "test", 11, "test!@gmail.com");
        assert_eq!(
            person.values(),
            vec![
                Value::Integer(1),
                Value::Text("test".into()),
                Value::Integer(11),
                Value::Text("test!@gmail.com".into()),
            ]
        );
    }

    #[test]
    fn memory_session_has_table() {
        with_session(|session| {
            session
                .persist(Person::of(1, "test", 11, "test!@gmail.com"))
                .unwrap();
            assert_eq!(session.context().len(), 1);
        });
    }

    #[test]
    fn file_session_reopens() {
        let mut test_session = TestSession::file();
        test_session
            .persist(Person::of(1, "test", 11, "test!@gmail.com"))
            .unwrap();

        let mut other = test_session.reopen().unwrap();
        assert_eq!(other.find::<Person>(1i64).unwrap().name, "test");
    }

    #[test]
    fn rejects_text_keys() {
        let mut person = Person::default();
        assert!(person.set_primary_key(PrimaryKey::from("a")).is_err());
        assert!(person.set_primary_key(PrimaryKey::from(3i64)).is_ok());
        assert_eq!(person.id, Some(3));
    }
}
