//! Data-layer configuration loaded from YAML.
//!
//! ```yaml
//! data:
//!   dialect: postgres
//!   default_page_size: 50
//!   sql:
//!     user:
//!       find_all: SELECT * FROM users
//! ```
//!
//! Resolution order (lowest to highest priority):
//! 1. the YAML file
//! 2. `.env` (loaded into the process environment, never overwriting)
//! 3. `DATA_DIALECT` / `DATA_ROWNUM_ALIAS` environment variables

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::dialect::{DialectKind, PaginationStrategy};
use crate::error::DataError;
use crate::page::Pageable;
use crate::sql_source::MapSqlSource;

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub dialect: DialectKind,
    #[serde(default)]
    pub rownum_alias: Option<String>,
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default)]
    sql: serde_yaml::Value,
}

fn default_page_size() -> u64 {
    20
}

#[derive(Deserialize)]
struct Root {
    data: DataConfig,
}

impl DataConfig {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            rownum_alias: None,
            default_page_size: default_page_size(),
            sql: serde_yaml::Value::Null,
        }
    }

    /// Parse the `data:` section of a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataError> {
        let root: Root = serde_yaml::from_str(yaml)
            .map_err(|e| DataError::configuration(format!("invalid data config: {e}")))?;
        root.data.validated()
    }

    /// Load `path`, then apply `.env` and environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DataError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml_str(&content)?;

        let _ = dotenvy::dotenv();
        if let Ok(dialect) = std::env::var("DATA_DIALECT") {
            config.dialect = dialect.parse()?;
        }
        if let Ok(alias) = std::env::var("DATA_ROWNUM_ALIAS") {
            config.rownum_alias = Some(alias);
        }
        tracing::info!(dialect = %config.dialect, path = %path.display(), "Data config loaded");
        config.validated()
    }

    fn validated(self) -> Result<Self, DataError> {
        if self.default_page_size == 0 {
            return Err(DataError::configuration("default_page_size must be greater than zero"));
        }
        Ok(self)
    }

    pub fn strategy(&self) -> Result<Arc<dyn PaginationStrategy>, DataError> {
        self.dialect.strategy(self.rownum_alias.as_deref())
    }

    /// SQL texts declared under `data.sql`.
    pub fn sql_source(&self) -> Result<MapSqlSource, DataError> {
        MapSqlSource::from_yaml_value(&self.sql)
    }

    /// First page using the configured default size.
    pub fn default_pageable(&self) -> Pageable {
        Pageable::new(0, self.default_page_size).unwrap_or_default()
    }
}
