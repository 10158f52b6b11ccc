//! Error types for entorm core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in entorm core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No row exists for the requested identity.
    #[error("entity not found: {key} in table {table}")]
    EntityNotFound {
        /// The table searched.
        table: String,
        /// The primary-key value that was not found.
        key: String,
    },

    /// The entity carries no primary-key value and none can be generated.
    #[error("entity in table {table} has no identifier")]
    MissingIdentifier {
        /// Table of the offending entity.
        table: String,
    },

    /// The metadata does not declare exactly one primary-key column.
    #[error("table {table} must declare exactly one primary key column, found {found}")]
    MissingPrimaryKeyColumn {
        /// Table of the offending metadata.
        table: String,
        /// Number of columns flagged as primary key.
        found: usize,
    },

    /// `Entity::values` disagrees with the metadata column list.
    #[error("table {table} declares {expected} columns but the entity produced {actual} values")]
    ColumnCountMismatch {
        /// Table of the offending entity.
        table: String,
        /// Number of declared columns.
        expected: usize,
        /// Number of values produced.
        actual: usize,
    },

    /// A row does not contain the requested column.
    #[error("unknown column: {column}")]
    UnknownColumn {
        /// The requested column.
        column: String,
    },

    /// A value could not be converted to the requested Rust type.
    #[error("type mismatch on column {column}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Column being read.
        column: String,
        /// Expected type name.
        expected: &'static str,
        /// Actual value kind.
        actual: &'static str,
    },

    /// A NULL was read into a non-optional type.
    #[error("unexpected NULL in column {column}")]
    UnexpectedNull {
        /// Column being read.
        column: String,
    },

    /// The underlying database driver failed.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an entity not found error.
    pub fn not_found(table: impl Into<String>, key: impl ToString) -> Self {
        Self::EntityNotFound {
            table: table.into(),
            key: key.to_string(),
        }
    }

    /// Creates a missing identifier error.
    pub fn missing_identifier(table: impl Into<String>) -> Self {
        Self::MissingIdentifier {
            table: table.into(),
        }
    }

    /// Creates an unknown column error.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// Creates an unexpected NULL error.
    pub fn unexpected_null(column: impl Into<String>) -> Self {
        Self::UnexpectedNull {
            column: column.into(),
        }
    }

    /// Wraps a driver error.
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
