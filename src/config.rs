//! Organizer configuration.
//!
//! This module holds the user-facing configuration for a run and turns it
//! into a [`RuleSet`]. Configuration can come from three places:
//! - a TOML configuration file
//! - the persisted settings store (see [`crate::settings`])
//! - built-in defaults
//!
//! # Configuration File Format
//!
//! ```toml
//! [categories.video]
//! enabled = true
//! destination = "Videos"
//! extensions = "mp4,mov,avi,mkv"
//!
//! [categories.other]
//! enabled = false
//! destination = "Other"
//!
//! [exclusion]
//! mode = "comment"   # or "name"
//! text = "keep"
//! ```
//!
//! Category tables that are left out keep their defaults. Inside a table,
//! `enabled` defaults to `true`, `destination` to empty (inert) and a missing
//! `extensions` list matches nothing. A value of the wrong type, or an
//! unknown exclusion mode, is logged and replaced by its default; only text
//! that is not TOML at all is rejected.

use crate::category::{Category, ExtensionSet};
use crate::rules::{CategoryRule, ExclusionMode, ExclusionRule, RuleSet};
use crate::settings::{
    self, EXCLUSION_MODE_KEY, EXCLUSION_TEXT_KEY, SettingValue, SettingsError, SettingsStore,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    /// An enabled category has no destination name; it is skipped.
    #[error("Category '{category}' is enabled but has no destination name")]
    MissingDestination { category: Category },
    /// The settings store could not be read or written.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Settings for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryConfig {
    pub enabled: bool,

    pub destination: String,

    /// Comma-separated extension list. Only used by video, image and audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<String>,
}

impl CategoryConfig {
    pub fn new(enabled: bool, destination: impl Into<String>) -> Self {
        Self {
            enabled,
            destination: destination.into(),
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: impl Into<String>) -> Self {
        self.extensions = Some(extensions.into());
        self
    }

    /// Out-of-the-box settings for `category`.
    pub fn default_for(category: Category) -> Self {
        Self {
            enabled: true,
            destination: category.default_destination().to_string(),
            extensions: category.default_extensions().map(str::to_string),
        }
    }

    /// Settings that leave `category` inert.
    pub fn disabled() -> Self {
        Self::new(false, "")
    }

    fn from_table(category: Category, fields: &toml::Table) -> Self {
        let section = category.to_string();
        Self {
            enabled: lenient(fields, &section, "enabled", toml::Value::as_bool).unwrap_or(true),
            destination: lenient(fields, &section, "destination", text).unwrap_or_default(),
            extensions: lenient(fields, &section, "extensions", text),
        }
    }

    fn to_rule(&self, category: Category) -> CategoryRule {
        let rule = CategoryRule::new(category, self.enabled, self.destination.clone());
        match (&self.extensions, category.has_extensions()) {
            (Some(list), true) => rule.with_extensions(ExtensionSet::parse(list)),
            _ => rule,
        }
    }
}

/// Per-category configuration tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryConfigs {
    pub video: CategoryConfig,
    pub image: CategoryConfig,
    pub audio: CategoryConfig,
    pub composition: CategoryConfig,
    pub solid: CategoryConfig,
    pub other: CategoryConfig,
}

impl CategoryConfigs {
    fn from_table(tables: &toml::Table) -> Self {
        Self::from_fn(|category| match tables.get(&category.to_string()) {
            None => CategoryConfig::default_for(category),
            Some(toml::Value::Table(fields)) => CategoryConfig::from_table(category, fields),
            Some(other) => {
                warn!(%category, kind = other.type_str(), "category is not a table, using defaults");
                CategoryConfig::default_for(category)
            }
        })
    }

    fn from_fn(mut make: impl FnMut(Category) -> CategoryConfig) -> Self {
        Self {
            video: make(Category::Video),
            image: make(Category::Image),
            audio: make(Category::Audio),
            composition: make(Category::Composition),
            solid: make(Category::Solid),
            other: make(Category::Other),
        }
    }

    pub fn get(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::Video => &self.video,
            Category::Image => &self.image,
            Category::Audio => &self.audio,
            Category::Composition => &self.composition,
            Category::Solid => &self.solid,
            Category::Other => &self.other,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryConfig {
        match category {
            Category::Video => &mut self.video,
            Category::Image => &mut self.image,
            Category::Audio => &mut self.audio,
            Category::Composition => &mut self.composition,
            Category::Solid => &mut self.solid,
            Category::Other => &mut self.other,
        }
    }
}

impl Default for CategoryConfigs {
    fn default() -> Self {
        Self::from_fn(CategoryConfig::default_for)
    }
}

/// Exclusion settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionConfig {
    pub mode: ExclusionMode,
    pub text: String,
}

impl ExclusionConfig {
    fn from_table(fields: &toml::Table) -> Self {
        let mode = lenient(fields, "exclusion", "mode", |value| match value.as_str()? {
            "name" => Some(ExclusionMode::Name),
            "comment" => Some(ExclusionMode::Comment),
            _ => None,
        });
        Self {
            mode: mode.unwrap_or_default(),
            text: lenient(fields, "exclusion", "text", text).unwrap_or_default(),
        }
    }
}

/// Complete configuration for one organizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizerConfig {
    pub categories: CategoryConfigs,
    pub exclusion: ExclusionConfig,
}

/// Reads `key` from `fields`, logging and discarding a value that `extract`
/// rejects. A missing key yields `None` silently.
fn lenient<'a, T>(
    fields: &'a toml::Table,
    section: &str,
    key: &str,
    extract: impl FnOnce(&'a toml::Value) -> Option<T>,
) -> Option<T> {
    let value = fields.get(key)?;
    let parsed = extract(value);
    if parsed.is_none() {
        warn!(
            section,
            key,
            kind = value.type_str(),
            "ignoring malformed configuration value, using default"
        );
    }
    parsed
}

fn text(value: &toml::Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

impl OrganizerConfig {
    /// A configuration with every category disabled and no exclusion.
    pub fn empty() -> Self {
        Self {
            categories: CategoryConfigs::from_fn(|_| CategoryConfig::disabled()),
            exclusion: ExclusionConfig::default(),
        }
    }

    pub fn with_category(mut self, category: Category, config: CategoryConfig) -> Self {
        *self.categories.get_mut(category) = config;
        self
    }

    pub fn with_exclusion(mut self, mode: ExclusionMode, text: impl Into<String>) -> Self {
        self.exclusion = ExclusionConfig {
            mode,
            text: text.into(),
        };
        self
    }

    pub fn category(&self, category: Category) -> &CategoryConfig {
        self.categories.get(category)
    }

    /// Configuration files looked up when none is given explicitly:
    /// `.projtidyrc.toml` in the current directory, then
    /// `~/.config/projtidy/config.toml`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".projtidyrc.toml")];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("projtidy")
                    .join("config.toml"),
            );
        }
        paths
    }

    /// Load configuration, falling back to the settings store.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. The first of `search_paths` that exists (see [`OrganizerConfig::search_paths`])
    /// 3. Read the persisted settings, using defaults for unset keys
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be read or
    /// is not TOML.
    pub fn load(
        config_path: Option<&Path>,
        search_paths: &[PathBuf],
        store: &dyn SettingsStore,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        if let Some(path) = search_paths.iter().find(|path| path.exists()) {
            return Self::load_from_file(path);
        }

        debug!("no configuration file found, reading persisted settings");
        Ok(Self::from_store(store))
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        debug!(path = %path.display(), "loading configuration file");

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigInvalid` only if `content` is not TOML.
    /// Malformed fields fall back to their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;

        let categories = match table.get("categories") {
            None => CategoryConfigs::default(),
            Some(toml::Value::Table(tables)) => CategoryConfigs::from_table(tables),
            Some(other) => {
                warn!(kind = other.type_str(), "`categories` is not a table, using defaults");
                CategoryConfigs::default()
            }
        };
        let exclusion = match table.get("exclusion") {
            None => ExclusionConfig::default(),
            Some(toml::Value::Table(fields)) => ExclusionConfig::from_table(fields),
            Some(other) => {
                warn!(kind = other.type_str(), "`exclusion` is not a table, using defaults");
                ExclusionConfig::default()
            }
        };

        Ok(Self {
            categories,
            exclusion,
        })
    }

    /// Build configuration from persisted settings. Unset keys take defaults.
    pub fn from_store(store: &dyn SettingsStore) -> Self {
        let categories = CategoryConfigs::from_fn(|category| {
            let defaults = CategoryConfig::default_for(category);
            let destination = store
                .load(
                    &settings::folder_key(category),
                    SettingValue::from(defaults.destination),
                )
                .as_text();
            let extensions = defaults.extensions.map(|list| {
                store
                    .load(&settings::extensions_key(category), SettingValue::from(list))
                    .as_text()
            });
            let enabled = store
                .load(&settings::enabled_key(category), SettingValue::from("true"))
                .is_true();

            CategoryConfig {
                enabled,
                destination,
                extensions,
            }
        });

        let text = store
            .load(EXCLUSION_TEXT_KEY, SettingValue::from(""))
            .as_text();
        let mode = ExclusionMode::from_setting(
            &store
                .load(EXCLUSION_MODE_KEY, SettingValue::from("name"))
                .as_text(),
        );

        Self {
            categories,
            exclusion: ExclusionConfig { mode, text },
        }
    }

    /// Persist this configuration so the next run starts from it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Settings` if the store rejects a write.
    pub fn save_to_store(&self, store: &mut dyn SettingsStore) -> Result<(), ConfigError> {
        for category in Category::ALL {
            let config = self.category(category);
            store.save(
                &settings::folder_key(category),
                SettingValue::from(config.destination.as_str()),
            )?;
            if category.has_extensions() {
                let list = config.extensions.clone().unwrap_or_default();
                store.save(&settings::extensions_key(category), SettingValue::from(list))?;
            }
            store.save(
                &settings::enabled_key(category),
                SettingValue::from(config.enabled),
            )?;
        }

        store.save(
            EXCLUSION_TEXT_KEY,
            SettingValue::from(self.exclusion.text.as_str()),
        )?;
        store.save(
            EXCLUSION_MODE_KEY,
            SettingValue::from(self.exclusion.mode.as_setting()),
        )?;
        Ok(())
    }

    /// Clear every persisted value and return the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Settings` if a key cannot be cleared.
    pub fn reset(store: &mut dyn SettingsStore) -> Result<Self, ConfigError> {
        for key in settings::all_keys() {
            store.clear(&key)?;
        }
        Ok(Self::default())
    }

    /// Serialize this configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile configuration into the rule set consumed by the router.
    pub fn compile(&self) -> RuleSet {
        let rules = Category::ALL.map(|category| self.category(category).to_rule(category));
        let exclusion = ExclusionRule::new(self.exclusion.mode, &self.exclusion.text);
        RuleSet::new(rules, exclusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    #[test]
    fn test_default_config_enables_everything() {
        let config = OrganizerConfig::default();
        for category in Category::ALL {
            let entry = config.category(category);
            assert!(entry.enabled);
            assert_eq!(entry.destination, category.default_destination());
            assert_eq!(
                entry.extensions.as_deref(),
                category.default_extensions()
            );
        }
        assert_eq!(config.exclusion.mode, ExclusionMode::Name);
        assert!(config.exclusion.text.is_empty());
    }

    #[test]
    fn test_parse_toml_partial_tables() {
        let config = OrganizerConfig::from_toml(
            r#"
            [categories.video]
            destination = "Clips"
            extensions = "mp4, MOV"

            [categories.other]
            enabled = false

            [exclusion]
            mode = "comment"
            text = "keep"
            "#,
        )
        .unwrap();

        assert!(config.categories.video.enabled);
        assert_eq!(config.categories.video.destination, "Clips");
        assert_eq!(config.categories.other.destination, "");
        assert!(!config.categories.other.enabled);
        // Untouched tables keep their defaults.
        assert_eq!(config.categories.image, CategoryConfig::default_for(Category::Image));
        assert_eq!(config.exclusion.mode, ExclusionMode::Comment);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = OrganizerConfig::from_toml("[categories.video\n");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_malformed_fields_fall_back_to_defaults() {
        let config = OrganizerConfig::from_toml(
            r#"
            [categories]
            solid = "off"

            [categories.video]
            enabled = "yes"
            destination = "Clips"
            extensions = ["mp4"]

            [categories.audio]
            destination = 7

            [exclusion]
            mode = "regex"
            text = "temp"
            "#,
        )
        .unwrap();

        let video = &config.categories.video;
        assert!(video.enabled);
        assert_eq!(video.destination, "Clips");
        assert_eq!(video.extensions, None);
        assert_eq!(config.categories.audio.destination, "");
        assert_eq!(config.categories.solid, CategoryConfig::default_for(Category::Solid));
        assert_eq!(config.exclusion.mode, ExclusionMode::Name);
        assert_eq!(config.exclusion.text, "temp");
    }

    #[test]
    fn test_non_table_sections_use_defaults() {
        let config = OrganizerConfig::from_toml("categories = 3\nexclusion = \"comment\"\n").unwrap();
        assert_eq!(config, OrganizerConfig::default());
    }

    #[test]
    fn test_load_uses_first_existing_search_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let found = temp_dir.path().join("found.toml");
        fs::write(&found, "[categories.composition]\ndestination = \"Comps\"\n").unwrap();

        let store = MemoryStore::new();
        let config = OrganizerConfig::load(None, &[missing, found], &store).unwrap();
        assert_eq!(config.categories.composition.destination, "Comps");

        let config = OrganizerConfig::load(None, &[], &store).unwrap();
        assert_eq!(config, OrganizerConfig::default());
    }

    #[test]
    fn test_missing_file_returns_not_found() {
        let result = OrganizerConfig::load_from_file(Path::new("/non/existent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_toml_round_trip_keeps_values() {
        let config = OrganizerConfig::default()
            .with_category(Category::Solid, CategoryConfig::new(false, "Solids"))
            .with_exclusion(ExclusionMode::Comment, "wip");
        let text = config.to_toml().unwrap();
        assert_eq!(OrganizerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_compile_parses_extensions() {
        let config = OrganizerConfig::empty().with_category(
            Category::Video,
            CategoryConfig::new(true, "Videos").with_extensions("MP4, mov"),
        );
        let rules = config.compile();
        let video = rules.rule(Category::Video);
        assert!(video.is_active());
        assert!(video.matches_file("clip.mov"));
        assert!(!rules.claims(Category::Other));
    }

    #[test]
    fn test_compile_ignores_extensions_for_non_media() {
        let config = OrganizerConfig::empty().with_category(
            Category::Composition,
            CategoryConfig::new(true, "Comp").with_extensions("mp4"),
        );
        let rules = config.compile();
        assert!(rules.rule(Category::Composition).extensions.is_empty());
    }

    #[test]
    fn test_absent_extensions_match_nothing() {
        let config = OrganizerConfig::empty()
            .with_category(Category::Audio, CategoryConfig::new(true, "Audio"));
        let rules = config.compile();
        assert!(rules.claims(Category::Audio));
        assert!(!rules.rule(Category::Audio).matches_file("a.wav"));
    }

    #[test]
    fn test_from_empty_store_is_default() {
        let store = MemoryStore::new();
        assert_eq!(OrganizerConfig::from_store(&store), OrganizerConfig::default());
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = MemoryStore::new();
        let config = OrganizerConfig::default()
            .with_category(
                Category::Image,
                CategoryConfig::new(false, "Stills").with_extensions("png"),
            )
            .with_exclusion(ExclusionMode::Comment, "skip");

        config.save_to_store(&mut store).unwrap();
        assert_eq!(store.len(), 17);
        assert_eq!(OrganizerConfig::from_store(&store), config);
    }

    #[test]
    fn test_from_store_reads_string_checkbox_values() {
        let mut store = MemoryStore::new();
        store.save("Solid_Value", "false".into()).unwrap();
        store.save("Other_Value", "true".into()).unwrap();
        store.save(EXCLUSION_MODE_KEY, "comment".into()).unwrap();

        let config = OrganizerConfig::from_store(&store);
        assert!(!config.categories.solid.enabled);
        assert!(config.categories.other.enabled);
        assert_eq!(config.exclusion.mode, ExclusionMode::Comment);
    }

    #[test]
    fn test_reset_clears_store() {
        let mut store = MemoryStore::new();
        OrganizerConfig::empty()
            .with_exclusion(ExclusionMode::Comment, "x")
            .save_to_store(&mut store)
            .unwrap();

        let config = OrganizerConfig::reset(&mut store).unwrap();
        assert!(store.is_empty());
        assert_eq!(config, OrganizerConfig::default());
        assert_eq!(OrganizerConfig::from_store(&store), OrganizerConfig::default());
    }
}
