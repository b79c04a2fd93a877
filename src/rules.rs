//! Validated routing rules for a single organizer run.
//!
//! A [`RuleSet`] is built once from an [`OrganizerConfig`](crate::config::OrganizerConfig)
//! and then only read. It holds one [`CategoryRule`] per category plus the
//! global [`ExclusionRule`].

use crate::category::{Category, ExtensionSet};
use crate::config::ConfigError;
use crate::item::ProjectItem;
use serde::Serialize;

/// What the exclusion text is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionMode {
    #[default]
    Name,
    Comment,
}

impl ExclusionMode {
    /// Value stored in the settings store for this mode.
    pub fn as_setting(&self) -> &'static str {
        match self {
            ExclusionMode::Name => "name",
            ExclusionMode::Comment => "comment",
        }
    }

    /// Parses a stored mode. Anything but `"comment"` selects name matching.
    pub fn from_setting(value: &str) -> Self {
        if value == "comment" {
            ExclusionMode::Comment
        } else {
            ExclusionMode::Name
        }
    }
}

/// Global substring filter applied before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRule {
    mode: ExclusionMode,
    needle: String,
}

impl ExclusionRule {
    pub fn new(mode: ExclusionMode, text: &str) -> Self {
        Self {
            mode,
            needle: text.to_lowercase(),
        }
    }

    /// True when the rule has no text and therefore never excludes.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Returns true if `item` is filtered out by this rule.
    ///
    /// Matching is case-insensitive substring containment against the item
    /// name or comment; a missing comment is treated as empty.
    pub fn is_excluded(&self, item: &ProjectItem) -> bool {
        if self.needle.is_empty() {
            return false;
        }

        let haystack = match self.mode {
            ExclusionMode::Name => item.name.to_lowercase(),
            ExclusionMode::Comment => item.comment_or_empty().to_lowercase(),
        };
        haystack.contains(&self.needle)
    }
}

/// Routing rule for a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Category,
    pub enabled: bool,
    pub destination: String,
    pub extensions: ExtensionSet,
}

impl CategoryRule {
    pub fn new(category: Category, enabled: bool, destination: impl Into<String>) -> Self {
        Self {
            category,
            enabled,
            destination: destination.into(),
            extensions: ExtensionSet::default(),
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionSet) -> Self {
        self.extensions = extensions;
        self
    }

    /// An active rule creates a destination and claims items.
    ///
    /// Rules that are disabled or have no destination name are inert.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.destination.is_empty()
    }

    /// True if this active rule claims a file named `file_name` by extension.
    pub fn matches_file(&self, file_name: &str) -> bool {
        self.is_active() && self.extensions.matches(file_name)
    }
}

/// The immutable rule configuration consumed by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: [CategoryRule; 6],
    exclusion: ExclusionRule,
}

impl RuleSet {
    /// Builds a rule set from one rule per category.
    ///
    /// Categories without a supplied rule are disabled. If a category appears
    /// more than once, the last rule wins.
    pub fn new(rules: impl IntoIterator<Item = CategoryRule>, exclusion: ExclusionRule) -> Self {
        let mut slots = Category::ALL.map(|category| CategoryRule::new(category, false, ""));
        for rule in rules {
            let index = rule.category.index();
            slots[index] = rule;
        }
        Self {
            rules: slots,
            exclusion,
        }
    }

    pub fn rule(&self, category: Category) -> &CategoryRule {
        &self.rules[category.index()]
    }

    pub fn exclusion(&self) -> &ExclusionRule {
        &self.exclusion
    }

    /// Whether `category` is active and may claim items.
    pub fn claims(&self, category: Category) -> bool {
        self.rule(category).is_active()
    }

    /// Active categories with their destination names, in settings order.
    pub fn active_destinations(&self) -> impl Iterator<Item = (Category, &str)> {
        self.rules
            .iter()
            .filter(|rule| rule.is_active())
            .map(|rule| (rule.category, rule.destination.as_str()))
    }

    /// Reports enabled categories that cannot take effect.
    ///
    /// These are not fatal: the affected category is skipped and the rest of
    /// the run proceeds.
    pub fn issues(&self) -> Vec<ConfigError> {
        self.rules
            .iter()
            .filter(|rule| rule.enabled && rule.destination.is_empty())
            .map(|rule| ConfigError::MissingDestination {
                category: rule.category,
            })
            .collect()
    }
}
