//! # entorm testkit
//!
//! Test utilities for entorm.
//!
//! This crate provides:
//! - The `Person` fixture entity and temporary SQLite sessions
//! - Property-based test generators using proptest
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entorm_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_session() {
//!     with_session(|session| {
//!         session.persist(Person::of(1, "kim", 30, "kim@example.com")).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use entorm_core::{CoreError, EntityManager};
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
