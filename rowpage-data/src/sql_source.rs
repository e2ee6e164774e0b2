use std::collections::HashMap;
use std::path::Path;

use crate::error::DataError;

/// Looks up SQL text by an opaque code, e.g. `user.find_by_email`.
pub trait SqlSource: Send + Sync {
    fn lookup(&self, code: &str) -> Result<String, DataError>;
}

/// In-memory [`SqlSource`] backed by a code -> SQL map.
///
/// YAML input is flattened into dotted codes:
///
/// ```yaml
/// user:
///   find_all: SELECT * FROM users
///   count: SELECT COUNT(*) FROM users
/// ```
///
/// yields `user.find_all` and `user.count`.
#[derive(Debug, Clone, Default)]
pub struct MapSqlSource {
    queries: HashMap<String, String>,
}

impl MapSqlSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: impl Into<String>, sql: impl Into<String>) -> Self {
        self.queries.insert(code.into(), sql.into());
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| DataError::configuration(format!("invalid SQL YAML: {e}")))?;
        Self::from_yaml_value(&value)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DataError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    pub(crate) fn from_yaml_value(value: &serde_yaml::Value) -> Result<Self, DataError> {
        let mut queries = HashMap::new();
        flatten_yaml("", value, &mut queries)?;
        Ok(Self { queries })
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Flatten a YAML tree into dot-separated codes. Leaves must be strings.
fn flatten_yaml(
    prefix: &str,
    value: &serde_yaml::Value,
    out: &mut HashMap<String, String>,
) -> Result<(), DataError> {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => {
                        return Err(DataError::configuration(format!(
                            "SQL code segments must be strings, got {other:?}"
                        )))
                    }
                };
                let full_key = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_yaml(&full_key, v, out)?;
            }
            Ok(())
        }
        serde_yaml::Value::String(sql) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), sql.trim().to_string());
            Ok(())
        }
        serde_yaml::Value::Null if prefix.is_empty() => Ok(()),
        other => Err(DataError::configuration(format!(
            "SQL text for `{prefix}` must be a string, got {other:?}"
        ))),
    }
}

impl SqlSource for MapSqlSource {
    fn lookup(&self, code: &str) -> Result<String, DataError> {
        self.queries
            .get(code)
            .cloned()
            .ok_or_else(|| DataError::configuration(format!("no SQL registered for code `{code}`")))
    }
}
