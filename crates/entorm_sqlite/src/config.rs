//! Connection configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for opening a SQLite connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file, `None` for a private in-memory database.
    pub path: Option<PathBuf>,

    /// Whether foreign key constraints are enforced.
    pub foreign_keys: bool,

    /// How long to wait on a locked database before failing.
    pub busy_timeout: Duration,

    /// Whether parent directories of `path` are created when missing.
    pub create_dirs: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
            create_dirs: false,
        }
    }
}

impl SqliteConfig {
    /// Creates an in-memory configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for the database file at `path`.
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Sets whether foreign keys are enforced.
    #[must_use]
    pub const fn foreign_keys(mut self, value: bool) -> Self {
        self.foreign_keys = value;
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Whether this configuration opens an in-memory database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_in_memory() {
        let config = SqliteConfig::default();
        assert!(config.is_in_memory());
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn file_config() {
        let config = SqliteConfig::file("data/app.db")
            .foreign_keys(false)
            .busy_timeout(Duration::from_millis(250));
        assert_eq!(config.path.as_deref(), Some(Path::new("data/app.db")));
        assert!(!config.foreign_keys);
        assert!(!config.is_in_memory());
    }
}
