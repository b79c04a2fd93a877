//! Command-line interface module for projtidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Loading configuration and persisted settings
//! - Routing a project snapshot and applying the plan
//! - Resetting persisted settings

use crate::config::OrganizerConfig;
use crate::output::OutputFormatter;
use crate::project::{Organizer, SnapshotProject};
use crate::router::Router;
use crate::settings::{FileStore, MemoryStore, SettingsStore};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Sort project items into folders by type, extension, and exclusion rules.
#[derive(Debug, Parser)]
#[command(name = "projtidy", version, about)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ~/.config/projtidy/settings.toml).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Route every item of a project snapshot into its destination folder.
    Organize {
        /// Project snapshot (JSON).
        snapshot: PathBuf,

        /// Configuration file; overrides persisted settings.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show the plan without applying it or saving settings.
        #[arg(long)]
        dry_run: bool,

        /// Where to write the organized snapshot (defaults to the input file).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Clear persisted settings back to defaults.
    Reset,
    /// Print the effective configuration as TOML.
    ShowConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Runs the CLI application.
///
/// Opens the settings store named on the command line (or the default one)
/// and executes the requested command against it, searching the default
/// configuration file locations.
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let search_paths = OrganizerConfig::search_paths();
    let path = cli.settings.clone().or_else(FileStore::default_path);
    match path {
        Some(path) => {
            let mut store = FileStore::open(&path)
                .map_err(|e| format!("Error opening settings: {}", e))?;
            run_cli_with_store(&cli.command, &search_paths, &mut store)
        }
        None => {
            warn!("no settings location available, settings will not persist");
            run_cli_with_store(&cli.command, &search_paths, &mut MemoryStore::new())
        }
    }
}

/// Runs a command against an explicit settings store.
///
/// `search_paths` are the configuration files tried, in order, when a command
/// is not given `--config`.
pub fn run_cli_with_store(
    command: &Command,
    search_paths: &[PathBuf],
    store: &mut dyn SettingsStore,
) -> Result<(), String> {
    match command {
        Command::Organize {
            snapshot,
            config,
            dry_run,
            output,
        } => organize_snapshot(
            snapshot,
            config.as_deref(),
            *dry_run,
            output.as_deref(),
            search_paths,
            store,
        ),
        Command::Reset => reset_settings(store),
        Command::ShowConfig { config } => show_config(config.as_deref(), search_paths, store),
    }
}

/// Organizes the items of a project snapshot.
///
/// This function:
/// 1. Loads configuration (file, then persisted settings, then defaults)
/// 2. Persists the effective configuration for the next run
/// 3. Routes every item of the snapshot
/// 4. Creates destination folders and moves items
/// 5. Writes the updated snapshot
pub fn organize_snapshot(
    snapshot_path: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    output_path: Option<&Path>,
    search_paths: &[PathBuf],
    store: &mut dyn SettingsStore,
) -> Result<(), String> {
    let config = OrganizerConfig::load(config_path, search_paths, store)
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    if !dry_run {
        config
            .save_to_store(store)
            .map_err(|e| format!("Error saving settings: {}", e))?;
    }

    let rules = config.compile();
    for issue in rules.issues() {
        OutputFormatter::warning(&format!("{}; skipping it", issue));
    }

    let mut project = SnapshotProject::load(snapshot_path)
        .map_err(|e| format!("Error loading snapshot: {}", e))?;
    let plan = Router::new(&rules).route(project.snapshot());

    if dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Routing plan for {}",
            snapshot_path.display()
        ));
    } else {
        OutputFormatter::info(&format!("Organizing {}", snapshot_path.display()));
    }
    OutputFormatter::plan_listing(&plan, project.snapshot());

    if dry_run {
        let mut counts = BTreeMap::new();
        for (category, count) in plan.counts() {
            let name = plan.destination_name(category).unwrap_or_default();
            *counts.entry(name.to_string()).or_insert(0) += count;
        }
        OutputFormatter::summary_table(&counts, plan.excluded_count(), plan.unmatched_count());
        OutputFormatter::dry_run_notice("No items were moved.");
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(plan.routed().count() as u64);
    let report = Organizer::apply_with_progress(&plan, &mut project, |_| pb.inc(1));
    pb.finish_and_clear();

    for (category, reason) in &report.failed_destinations {
        OutputFormatter::error(&format!("{} destination skipped: {}", category, reason));
    }
    for (item, reason) in &report.failed_moves {
        OutputFormatter::error(&format!("{} not moved: {}", item, reason));
    }

    let output_path = output_path.unwrap_or(snapshot_path);
    project
        .save(output_path)
        .map_err(|e| format!("Error writing snapshot: {}", e))?;

    OutputFormatter::summary_table(
        &report.counts_by_destination(),
        plan.excluded_count(),
        plan.unmatched_count(),
    );

    if report.is_complete_success() {
        OutputFormatter::success(&format!(
            "Organization complete. Snapshot written to {}",
            output_path.display()
        ));
    } else {
        OutputFormatter::warning("Some items could not be organized. Please review errors above.");
    }

    Ok(())
}

/// Clears every persisted setting.
fn reset_settings(store: &mut dyn SettingsStore) -> Result<(), String> {
    OrganizerConfig::reset(store).map_err(|e| format!("Error resetting settings: {}", e))?;
    OutputFormatter::success("Settings restored to defaults.");
    Ok(())
}

/// Prints the configuration the next run would use.
fn show_config(
    config_path: Option<&Path>,
    search_paths: &[PathBuf],
    store: &dyn SettingsStore,
) -> Result<(), String> {
    let config = OrganizerConfig::load(config_path, search_paths, store)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let text = config
        .to_toml()
        .map_err(|e| format!("Error rendering configuration: {}", e))?;
    OutputFormatter::plain(&text);
    Ok(())
}
