//! # entorm SQLite
//!
//! SQLite driver for entorm sessions.
//!
//! This crate provides:
//! - [`SqliteExecutor`], an [`Executor`](entorm_core::Executor) over a
//!   rusqlite connection
//! - Connection bootstrap from a [`SqliteConfig`] (in-memory or file)
//! - [`open_session`] to get a ready [`SqliteSession`]
//!
//! ## Example
//!
//! ```rust
//! use entorm_sqlite::{open_session, SqliteConfig};
//!
//! let session = open_session(&SqliteConfig::new()).unwrap();
//! assert!(session.context().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod db;
mod error;
mod executor;

pub use config::SqliteConfig;
pub use error::{SqliteError, SqliteResult};
pub use executor::SqliteExecutor;

use entorm_core::sql::SqliteDialect;
use entorm_core::{Config, Session};

/// A session running on SQLite.
pub type SqliteSession = Session<SqliteExecutor>;

/// Opens a database and starts a session with the default session
/// configuration.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or configured.
pub fn open_session(config: &SqliteConfig) -> SqliteResult<SqliteSession> {
    open_session_with(config, Config::default())
}

/// Opens a database and starts a session with `session_config`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or configured.
pub fn open_session_with(
    config: &SqliteConfig,
    session_config: Config,
) -> SqliteResult<SqliteSession> {
    let executor = SqliteExecutor::open(config)?;
    Ok(Session::with_config(executor, SqliteDialect, session_config))
}
