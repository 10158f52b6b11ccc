//! Error types for the SQLite driver.

use entorm_core::CoreError;
use thiserror::Error;

/// Result type for SQLite driver operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Errors raised by the SQLite driver.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// The underlying SQLite call failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// An I/O error occurred while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A column holds a type entities cannot represent.
    #[error("column {column} has unsupported type {kind}")]
    UnsupportedColumn {
        /// Column name.
        column: String,
        /// SQLite storage class found.
        kind: &'static str,
    },

    /// A text column is not valid UTF-8.
    #[error("column {column} is not valid UTF-8")]
    InvalidText {
        /// Column name.
        column: String,
        /// Decoding failure.
        #[source]
        source: std::str::Utf8Error,
    },
}

impl From<SqliteError> for CoreError {
    fn from(err: SqliteError) -> Self {
        CoreError::driver(err)
    }
}

/// Maps a rusqlite error into the core error type.
pub(crate) fn from_rusqlite(err: rusqlite::Error) -> CoreError {
    SqliteError::from(err).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_driver_error() {
        let err: CoreError = SqliteError::UnsupportedColumn {
            column: "payload".into(),
            kind: "BLOB",
        }
        .into();
        assert!(matches!(err, CoreError::Driver(_)));
        assert!(err.to_string().contains("payload"));
    }
}
