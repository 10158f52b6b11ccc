//! Connection bootstrap.

use crate::config::SqliteConfig;
use crate::error::SqliteResult;
use rusqlite::Connection;
use tracing::debug;

/// Opens a connection as described by `config` and applies its settings.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or configured.
pub fn open(config: &SqliteConfig) -> SqliteResult<Connection> {
    let conn = match &config.path {
        Some(path) => {
            if config.create_dirs {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            debug!(path = %path.display(), "opening sqlite database");
            Connection::open(path)?
        }
        None => {
            debug!("opening in-memory sqlite database");
            Connection::open_in_memory()?
        }
    };
    configure(&conn, config)?;
    Ok(conn)
}

/// Applies connection settings from `config`.
///
/// # Errors
///
/// Returns an error if a pragma cannot be applied.
pub fn configure(conn: &Connection, config: &SqliteConfig) -> SqliteResult<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys}"))?;
    conn.busy_timeout(config.busy_timeout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pragma(conn: &Connection, name: &str) -> i64 {
        conn.query_row(&format!("PRAGMA {name}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn in_memory_enables_foreign_keys() {
        let conn = open(&SqliteConfig::new()).unwrap();
        assert_eq!(pragma(&conn, "foreign_keys"), 1);
    }

    #[test]
    fn foreign_keys_can_be_disabled() {
        let conn = open(&SqliteConfig::new().foreign_keys(false)).unwrap();
        assert_eq!(pragma(&conn, "foreign_keys"), 0);
    }

    #[test]
    fn file_database_with_created_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");
        let conn = open(&SqliteConfig::file(&path).create_dirs(true)).unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        assert!(path.exists());
    }
}
