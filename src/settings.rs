//! Persisted organizer settings.
//!
//! Settings are an opaque key-value store holding one string or boolean per
//! form field. Keys follow the `{Category}_Folder`, `{Category}_Extensions`,
//! `{Category}_Value` scheme plus the two `ExclusionPanel_*` keys.
//!
//! Two stores are provided: [`MemoryStore`] for embedding and tests, and
//! [`FileStore`], which keeps the values in a TOML file:
//!
//! ```toml
//! [settings]
//! Videos_Folder = "Footage/Video"
//! Videos_Value = true
//! ExclusionPanel_Value = "comment"
//! ```

use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

pub const EXCLUSION_TEXT_KEY: &str = "ExclusionPanel_Text";
pub const EXCLUSION_MODE_KEY: &str = "ExclusionPanel_Value";

pub fn folder_key(category: Category) -> String {
    format!("{}_Folder", category.settings_key())
}

pub fn extensions_key(category: Category) -> String {
    format!("{}_Extensions", category.settings_key())
}

pub fn enabled_key(category: Category) -> String {
    format!("{}_Value", category.settings_key())
}

/// Every key the organizer reads or writes.
pub fn all_keys() -> Vec<String> {
    let mut keys = Vec::new();
    for category in Category::ALL {
        keys.push(folder_key(category));
        if category.has_extensions() {
            keys.push(extensions_key(category));
        }
        keys.push(enabled_key(category));
    }
    keys.push(EXCLUSION_TEXT_KEY.to_string());
    keys.push(EXCLUSION_MODE_KEY.to_string());
    keys
}

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    /// Returns the value as text; booleans render as `"true"`/`"false"`.
    pub fn as_text(&self) -> String {
        match self {
            SettingValue::Bool(value) => value.to_string(),
            SettingValue::Text(text) => text.clone(),
        }
    }

    /// Interprets the value as a checkbox state.
    ///
    /// Only `true` and the string `"true"` count as checked.
    pub fn is_true(&self) -> bool {
        match self {
            SettingValue::Bool(value) => *value,
            SettingValue::Text(text) => text == "true",
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

/// Errors raised by persistent settings stores.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Key-value repository for organizer settings.
pub trait SettingsStore {
    /// Returns the stored value, or `None` when the key is unset or cleared.
    fn get(&self, key: &str) -> Option<SettingValue>;

    fn save(&mut self, key: &str, value: SettingValue) -> SettingsResult<()>;

    fn clear(&mut self, key: &str) -> SettingsResult<()>;

    /// Returns the stored value or `default` when the key is unset.
    fn load(&self, key: &str, default: SettingValue) -> SettingValue {
        self.get(key).unwrap_or(default)
    }
}

/// In-memory settings store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, SettingValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: SettingValue) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> SettingsResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile<V> {
    #[serde(default = "BTreeMap::new")]
    settings: BTreeMap<String, V>,
}

/// Converts a raw TOML value written by any tool into a stored value.
///
/// Other scalars are kept as their text; arrays and tables are dropped.
fn stored_value(key: &str, value: toml::Value) -> Option<SettingValue> {
    match value {
        toml::Value::Boolean(flag) => Some(SettingValue::Bool(flag)),
        toml::Value::String(text) => Some(SettingValue::Text(text)),
        toml::Value::Integer(number) => Some(SettingValue::Text(number.to_string())),
        toml::Value::Float(number) => Some(SettingValue::Text(number.to_string())),
        toml::Value::Datetime(stamp) => Some(SettingValue::Text(stamp.to_string())),
        other => {
            warn!(key, kind = other.type_str(), "ignoring unsupported setting value");
            None
        }
    }
}

/// Settings store backed by a TOML file. Every write is flushed to disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, SettingValue>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Read` if the file exists but cannot be read and
    /// `SettingsError::Invalid` if it is not valid TOML.
    pub fn open(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| SettingsError::Read {
            path: path.clone(),
            source: e,
        })?;
        let file: SettingsFile<toml::Value> =
            toml::from_str(&content).map_err(|e| SettingsError::Invalid {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let values = file
            .settings
            .into_iter()
            .filter_map(|(key, value)| stored_value(&key, value).map(|value| (key, value)))
            .collect();

        Ok(Self { path, values })
    }

    /// Default location: `~/.config/projtidy/settings.toml`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("projtidy")
                .join("settings.toml")
        })
    }

    fn flush(&self) -> SettingsResult<()> {
        let file = SettingsFile {
            settings: self.values.clone(),
        };
        let content = toml::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }

        fs::write(&self.path, content).map_err(|e| SettingsError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: SettingValue) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn clear(&mut self, key: &str) -> SettingsResult<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
