//! projtidy - sort project items into folders by type
//!
//! This library classifies the items of a project (compositions, footage,
//! solids) into typed destination buckets. Rules come from a TOML file or
//! from persisted settings, are compiled once into a [`RuleSet`], and a
//! [`Router`] turns a project snapshot into a [`RoutingPlan`] that an
//! [`Organizer`] applies to the host project.

pub mod category;
pub mod cli;
pub mod config;
pub mod item;
pub mod output;
pub mod project;
pub mod router;
pub mod rules;
pub mod settings;

pub use category::{Category, ExtensionSet};
pub use config::{CategoryConfig, ConfigError, OrganizerConfig};
pub use item::{FootageSource, ItemId, ItemKind, ProjectItem, ProjectSnapshot};
pub use project::{ApplyReport, Organizer, OrganizeError, ProjectHost, SnapshotProject};
pub use router::{Disposition, Router, RoutingDecision, RoutingPlan, classify};
pub use rules::{CategoryRule, ExclusionMode, ExclusionRule, RuleSet};
pub use settings::{FileStore, MemoryStore, SettingValue, SettingsStore};

pub use cli::{Cli, Command, run_cli};
