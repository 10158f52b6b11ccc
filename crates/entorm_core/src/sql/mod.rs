//! Dialect-driven SQL generation.
//!
//! DDL is rendered as plain strings; DML is rendered as parameterized
//! [`Statement`]s for the [`Executor`](crate::Executor).

mod ddl;
mod dialect;
pub mod dml;

pub use ddl::{CreateTableBuilder, DropTableBuilder};
pub use dialect::{Dialect, H2Dialect, PostgresDialect, SqliteDialect};
pub use dml::Statement;
