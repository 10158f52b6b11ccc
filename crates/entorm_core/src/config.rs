//! Session configuration.

use crate::error::CoreResult;
use serde::Deserialize;

/// Configuration for an entity manager session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether UPDATE statements list only the changed columns.
    ///
    /// When false every non-key column is written.
    pub dynamic_update: bool,

    /// Whether executed SQL is logged at INFO level instead of TRACE.
    pub show_sql: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dynamic_update: true,
            show_sql: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the JSON is malformed.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets whether updates list only changed columns.
    #[must_use]
    pub const fn dynamic_update(mut self, value: bool) -> Self {
        self.dynamic_update = value;
        self
    }

    /// Sets whether executed SQL is logged at INFO level.
    #[must_use]
    pub const fn show_sql(mut self, value: bool) -> Self {
        self.show_sql = value;
        self
    }
}
