//! # entorm core
//!
//! Persistence context and dirty checking for a minimal entity mapper.
//!
//! This crate provides:
//! - Entity metadata (table, columns, key generation)
//! - A persistence context: per-session identity map plus entity snapshots
//! - Snapshot-based dirty checking
//! - Parameterized DDL / DML generation for several SQL dialects
//! - An [`EntityManager`] session that drives the context against any
//!   [`Executor`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entorm_core::{EntityManager, Session};
//! use entorm_core::sql::SqliteDialect;
//!
//! let mut session = Session::new(executor, SqliteDialect);
//! session.persist(Person::of(1, "kim", 30, "kim@example.com"))?;
//!
//! // Served from the first-level cache, no SQL issued.
//! let person = session.find::<Person>(1)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod entity;
mod error;
mod executor;
mod manager;
mod snapshot;
pub mod sql;
mod value;

pub use config::Config;
pub use context::{DirtyEntity, PersistenceContext};
pub use entity::{
    ColumnMetadata, ColumnType, Entity, EntityId, EntityMetadata, EntityType, GenerationType,
    ManagedEntity, PrimaryKey,
};
pub use error::{CoreError, CoreResult};
pub use executor::{Executor, Row};
pub use manager::{EntityManager, Session};
pub use snapshot::{DirtyColumn, EntitySnapshot};
pub use value::{FromValue, Value};
