/// Applying routing plans to a host project.
///
/// The host owns the real item collection. This module defines the narrow
/// interface the organizer needs from it ([`ProjectHost`]), carries out a
/// [`RoutingPlan`] against that interface, and provides [`SnapshotProject`],
/// an in-memory host over a JSON project snapshot.
use crate::category::Category;
use crate::item::{ItemId, ProjectItem, ProjectSnapshot};
use crate::router::{Action, RoutingPlan};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Label of the host transaction wrapping one organizer run.
pub const TRANSACTION_LABEL: &str = "Organize Project Items";

/// Errors that can occur while applying a plan or reading snapshots.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The host refused to create a destination folder.
    #[error("Failed to create folder '{name}': {reason}")]
    FolderCreationFailed { name: String, reason: String },
    /// An action referenced an item the host does not know.
    #[error("Unknown item {item}")]
    UnknownItem { item: ItemId },
    /// A move target is not a folder.
    #[error("Item {item} is not a folder")]
    NotAFolder { item: ItemId },
    /// Failed to read a snapshot file.
    #[error("Failed to read snapshot {}: {source}", .path.display())]
    SnapshotReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a snapshot file.
    #[error("Failed to write snapshot {}: {source}", .path.display())]
    SnapshotWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Snapshot file has invalid format.
    #[error("Invalid snapshot format: {reason}")]
    InvalidSnapshot { reason: String },
}

/// Result type for organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Opaque reference to a folder created by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderHandle(pub ItemId);

/// The operations the organizer needs from the project that owns the items.
pub trait ProjectHost {
    /// Creates a new folder at the project root.
    fn create_folder(&mut self, name: &str) -> OrganizeResult<FolderHandle>;

    /// Moves `item` into `folder`.
    fn set_parent(&mut self, item: ItemId, folder: FolderHandle) -> OrganizeResult<()>;

    /// Opens the atomic (undoable) host transaction for a run.
    fn begin_transaction(&mut self, _label: &str) {}

    /// Closes the transaction opened by [`ProjectHost::begin_transaction`].
    fn end_transaction(&mut self) {}
}

/// A single completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub item: ItemId,
    pub category: Category,
    pub destination: String,
}

/// Result of applying a plan.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// When the plan was applied.
    pub timestamp: DateTime<Utc>,
    /// Destinations that were created.
    pub created: Vec<(Category, String)>,
    /// Items moved, in item order.
    pub moved: Vec<MoveRecord>,
    /// Destinations that could not be created, with the reason.
    pub failed_destinations: Vec<(Category, String)>,
    /// Items that could not be moved, with the reason.
    pub failed_moves: Vec<(ItemId, String)>,
}

impl ApplyReport {
    fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            created: Vec::new(),
            moved: Vec::new(),
            failed_destinations: Vec::new(),
            failed_moves: Vec::new(),
        }
    }

    /// Returns true if every destination was created and every move succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.failed_destinations.is_empty() && self.failed_moves.is_empty()
    }

    /// Moved items per destination name.
    pub fn counts_by_destination(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.moved {
            *counts.entry(record.destination.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Carries out routing plans against a host.
pub struct Organizer;

impl Organizer {
    /// Applies `plan` to `host` inside a single host transaction.
    ///
    /// Destinations are created first, in plan order; then items are moved in
    /// ascending item order. A destination that cannot be created only skips
    /// the moves into it, and a failed move only affects that item.
    ///
    /// # Examples
    ///
    /// ```
    /// use projtidy::config::OrganizerConfig;
    /// use projtidy::item::{ProjectItem, ProjectSnapshot};
    /// use projtidy::project::{Organizer, SnapshotProject};
    /// use projtidy::router::Router;
    ///
    /// let snapshot = ProjectSnapshot::new(vec![ProjectItem::file("a.mp4")]);
    /// let rules = OrganizerConfig::default().compile();
    /// let plan = Router::new(&rules).route(&snapshot);
    ///
    /// let mut project = SnapshotProject::new(snapshot);
    /// let report = Organizer::apply(&plan, &mut project);
    /// assert_eq!(report.moved.len(), 1);
    /// assert_eq!(report.moved[0].destination, "Videos");
    /// ```
    pub fn apply<H: ProjectHost + ?Sized>(plan: &RoutingPlan, host: &mut H) -> ApplyReport {
        Self::apply_with_progress(plan, host, |_| {})
    }

    /// Same as [`Organizer::apply`], calling `on_item` after each attempted move.
    pub fn apply_with_progress<H, F>(plan: &RoutingPlan, host: &mut H, mut on_item: F) -> ApplyReport
    where
        H: ProjectHost + ?Sized,
        F: FnMut(ItemId),
    {
        let mut report = ApplyReport::new();
        host.begin_transaction(TRANSACTION_LABEL);

        let mut folders: BTreeMap<Category, (FolderHandle, String)> = BTreeMap::new();
        for action in plan.actions() {
            match action {
                Action::CreateFolder { category, name } => match host.create_folder(&name) {
                    Ok(handle) => {
                        debug!(%category, folder = %name, "created destination");
                        report.created.push((category, name.clone()));
                        folders.insert(category, (handle, name));
                    }
                    Err(e) => {
                        warn!(%category, folder = %name, error = %e, "skipping category");
                        report.failed_destinations.push((category, e.to_string()));
                    }
                },
                Action::SetParent { item, category } => {
                    // Categories whose folder failed were already reported once.
                    if let Some((handle, name)) = folders.get(&category) {
                        match host.set_parent(item, *handle) {
                            Ok(()) => report.moved.push(MoveRecord {
                                item,
                                category,
                                destination: name.clone(),
                            }),
                            Err(e) => {
                                warn!(%item, error = %e, "failed to move item");
                                report.failed_moves.push((item, e.to_string()));
                            }
                        }
                    }
                    on_item(item);
                }
            }
        }

        host.end_transaction();
        report
    }
}

/// In-memory project host over a [`ProjectSnapshot`].
///
/// Created folders are appended to the snapshot, and moves update item
/// parents, so the snapshot can be written back out after a run.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProject {
    snapshot: ProjectSnapshot,
}

impl SnapshotProject {
    pub fn new(snapshot: ProjectSnapshot) -> Self {
        Self { snapshot }
    }

    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::SnapshotReadFailed` if the file cannot be read and
    /// `OrganizeError::InvalidSnapshot` if it is not a valid snapshot.
    pub fn load(path: &Path) -> OrganizeResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| OrganizeError::SnapshotReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot: ProjectSnapshot =
            serde_json::from_str(&json).map_err(|e| OrganizeError::InvalidSnapshot {
                reason: format!("JSON parse error: {}", e),
            })?;
        Ok(Self::new(snapshot))
    }

    /// Writes the current snapshot to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(&self.snapshot).map_err(|e| {
            OrganizeError::InvalidSnapshot {
                reason: format!("JSON serialization failed: {}", e),
            }
        })?;
        fs::write(path, json).map_err(|e| OrganizeError::SnapshotWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    /// Name of the folder containing `item`, if it is inside one.
    pub fn parent_name(&self, item: ItemId) -> Option<&str> {
        let parent = self.snapshot.get(item)?.parent?;
        self.snapshot.get(parent).map(|folder| folder.name.as_str())
    }
}

impl ProjectHost for SnapshotProject {
    fn create_folder(&mut self, name: &str) -> OrganizeResult<FolderHandle> {
        let id = self.snapshot.push(ProjectItem::folder(name));
        Ok(FolderHandle(id))
    }

    fn set_parent(&mut self, item: ItemId, folder: FolderHandle) -> OrganizeResult<()> {
        let target = self
            .snapshot
            .get(folder.0)
            .ok_or(OrganizeError::UnknownItem { item: folder.0 })?;
        if !target.is_folder() {
            return Err(OrganizeError::NotAFolder { item: folder.0 });
        }

        let entry = self
            .snapshot
            .get_mut(item)
            .ok_or(OrganizeError::UnknownItem { item })?;
        entry.parent = Some(folder.0);
        Ok(())
    }
}
