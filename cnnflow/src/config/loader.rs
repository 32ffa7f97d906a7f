//! YAML configuration loading.

use crate::errors::ConfigError;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::info;

/// A read-only view over a parsed YAML mapping.
///
/// Values can be reached by key, by dotted path (`"data_ingestion.unzip_dir"`),
/// or by deserializing a whole section into a typed record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBox {
    /// Dotted path of this mapping from the document root; empty for the root.
    prefix: String,
    root: Mapping,
}

impl ConfigBox {
    /// Wraps a mapping found at `prefix`.
    #[must_use]
    pub fn from_mapping(prefix: impl Into<String>, root: Mapping) -> Self {
        Self {
            prefix: prefix.into(),
            root,
        }
    }

    /// Returns the dotted path of this mapping, or `<root>` for the document.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.prefix.is_empty() {
            "<root>"
        } else {
            &self.prefix
        }
    }

    /// Returns the string keys of this mapping in document order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.root.keys().filter_map(Value::as_str).collect()
    }

    /// Returns true if `key` is present with a non-null value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value under `key`, treating explicit nulls as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key).filter(|v| !v.is_null())
    }

    /// Walks a dotted path such as `"prepare_base_model.base_model_path"`.
    #[must_use]
    pub fn get_path(&self, dotted: &str) -> Option<&Value> {
        let mut parts = dotted.split('.');
        let first = parts.next()?;
        let mut current = self.get(first)?;
        for part in parts {
            current = current.as_mapping()?.get(part).filter(|v| !v.is_null())?;
        }
        Some(current)
    }

    /// Returns the string value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKeys`] if the key is absent, or
    /// [`ConfigError::InvalidValue`] if it is not a string.
    pub fn get_str(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self
            .get(key)
            .ok_or_else(|| ConfigError::missing_keys(self.name(), vec![key.to_string()]))?;
        value
            .as_str()
            .ok_or_else(|| ConfigError::invalid_value(self.qualify(key), "expected a string"))
    }

    /// Returns the nested mapping under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKeys`] if the key is absent, or
    /// [`ConfigError::NotAMapping`] if the value is not a mapping.
    pub fn section(&self, key: &str) -> Result<Self, ConfigError> {
        let value = self
            .get(key)
            .ok_or_else(|| ConfigError::missing_keys(self.name(), vec![key.to_string()]))?;
        let mapping = value.as_mapping().ok_or_else(|| ConfigError::NotAMapping {
            section: self.qualify(key),
        })?;
        Ok(Self::from_mapping(self.qualify(key), mapping.clone()))
    }

    /// Checks that every key in `keys` is present.
    ///
    /// # Errors
    ///
    /// Returns one [`ConfigError::MissingKeys`] listing all absent keys.
    pub fn require(&self, keys: &[&str]) -> Result<(), ConfigError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| !self.contains_key(key))
            .map(|key| (*key).to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::missing_keys(self.name(), missing))
        }
    }

    /// Deserializes this mapping into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the mapping does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_yaml::from_value(Value::Mapping(self.root.clone()))
            .map_err(|e| ConfigError::invalid_value(self.name(), e.to_string()))
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    fn qualify(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }
}

/// Reads a YAML file into a [`ConfigBox`].
///
/// # Errors
///
/// - [`ConfigError::Io`] if the file cannot be read
/// - [`ConfigError::Empty`] if the document is blank or null
/// - [`ConfigError::Parse`] if the YAML is malformed
/// - [`ConfigError::NotAMapping`] if the top level is not a mapping
pub fn read_yaml(path: &Path) -> Result<ConfigBox, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if is_blank_document(&raw) {
        return Err(ConfigError::Empty {
            path: path.to_path_buf(),
        });
    }

    let value: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let config = match value {
        Value::Null => {
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            })
        }
        Value::Mapping(mapping) => ConfigBox::from_mapping("", mapping),
        _ => {
            return Err(ConfigError::NotAMapping {
                section: "<root>".to_string(),
            })
        }
    };

    info!(path = %path.display(), "yaml file: {} loaded successfully", path.display());
    Ok(config)
}

fn is_blank_document(raw: &str) -> bool {
    raw.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---" || line == "...")
}
