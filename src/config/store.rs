//! JSON settings file: `.git-commit-simplifier.json`.
//!
//! The file in the current directory wins when it exists; otherwise the one in
//! the home directory is used (and created there by `init`).

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ConfigError;

use super::{ConfigLookup, default_values};

pub const CONFIG_FILE_NAME: &str = ".git-commit-simplifier.json";

/// Resolve the settings file location.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().ok();
    let home = dirs::home_dir();
    resolve_config_path(cwd.as_deref(), home.as_deref())
}

/// Location rule, separated from the process environment for testing.
pub fn resolve_config_path(
    cwd: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(cwd) = cwd {
        let local = cwd.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok(local);
        }
    }

    home.map(|h| h.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Settings persisted as a flat JSON object.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Load the file, with stored values layered over the defaults.
    ///
    /// A missing file yields the defaults without creating it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut values = default_values();

        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
            let stored = parse_object(path, &content)?;
            values.extend(stored);
        } else {
            debug!("No settings file at {}, using defaults", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Create the file with default values if it does not exist, then load it.
    pub fn init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let store = Self {
                path: path.to_path_buf(),
                values: default_values(),
            };
            store.save()?;
            debug!("Created settings file at {}", path.display());
            return Ok(store);
        }

        Self::load(path)
    }

    /// Write all values to disk atomically.
    pub fn save(&self) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let content = serde_json::to_string_pretty(&self.values).map_err(|e| {
            ConfigError::ParseFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }

    /// Set a value and persist the whole file.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value);
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl ConfigLookup for ConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

fn parse_object(path: &Path, content: &str) -> Result<Map<String, Value>, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: format!("expected a JSON object, found {}", type_name(&other)),
        }),
        Err(e) => Err(ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
