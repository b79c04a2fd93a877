//! Project item model.
//!
//! Items are supplied by the host as an ordered, 1-indexed sequence. The
//! organizer only reads them; moves are expressed as actions against the
//! host (see [`crate::project`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based position of an item in the host's enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl ItemId {
    /// Converts a zero-based index into an item id.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// Returns the zero-based index of this item, or `None` for id 0.
    pub fn index(&self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a footage item's pixels or samples come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FootageSource {
    /// A generated solid.
    Solid,
    /// A file on disk.
    File {
        /// File name including its extension.
        name: String,
    },
    /// Any other source (placeholders, proxies, ...).
    Other,
}

/// The closed set of item variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    /// A container. Never classified.
    Folder,
    Composition,
    Footage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<FootageSource>,
    },
}

/// A single entry in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub kind: ItemKind,
    /// The folder this item currently lives in; `None` means the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,
}

impl ProjectItem {
    pub fn folder(name: impl Into<String>) -> Self {
        Self::new(name, ItemKind::Folder)
    }

    pub fn composition(name: impl Into<String>) -> Self {
        Self::new(name, ItemKind::Composition)
    }

    /// Footage backed by a file whose name equals the item name.
    pub fn file(name: impl Into<String>) -> Self {
        let name = name.into();
        let source = FootageSource::File { name: name.clone() };
        Self::new(name, ItemKind::Footage { source: Some(source) })
    }

    pub fn solid(name: impl Into<String>) -> Self {
        Self::new(
            name,
            ItemKind::Footage {
                source: Some(FootageSource::Solid),
            },
        )
    }

    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            comment: None,
            kind,
            parent: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder)
    }

    /// Returns the backing file name for file footage.
    pub fn file_name(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Footage {
                source: Some(FootageSource::File { name }),
            } => Some(name),
            _ => None,
        }
    }

    /// Returns the item comment, or an empty string when it has none.
    pub fn comment_or_empty(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// An ordered snapshot of the host's project items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default)]
    pub items: Vec<ProjectItem>,
}

impl ProjectSnapshot {
    pub fn new(items: Vec<ProjectItem>) -> Self {
        Self { items }
    }

    /// Iterates items in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ProjectItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (ItemId::from_index(index), item))
    }

    pub fn get(&self, id: ItemId) -> Option<&ProjectItem> {
        id.index().and_then(|index| self.items.get(index))
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut ProjectItem> {
        id.index().and_then(|index| self.items.get_mut(index))
    }

    /// Appends an item and returns its id.
    pub fn push(&mut self, item: ProjectItem) -> ItemId {
        self.items.push(item);
        ItemId(self.items.len())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ids_are_one_based() {
        let snapshot = ProjectSnapshot::new(vec![
            ProjectItem::file("a.mp4"),
            ProjectItem::composition("Main"),
        ]);
        let ids: Vec<_> = snapshot.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ItemId(1), ItemId(2)]);
        assert_eq!(snapshot.get(ItemId(2)).unwrap().name, "Main");
        assert!(snapshot.get(ItemId(0)).is_none());
        assert!(snapshot.get(ItemId(3)).is_none());
    }

    #[test]
    fn test_file_name_only_for_file_footage() {
        assert_eq!(ProjectItem::file("a.mp4").file_name(), Some("a.mp4"));
        assert_eq!(ProjectItem::solid("Black Solid 1").file_name(), None);
        assert_eq!(ProjectItem::composition("a.mp4").file_name(), None);
    }

    #[test]
    fn test_deserialize_snapshot_json() {
        let json = r#"{
            "items": [
                { "name": "Footage", "type": "folder" },
                { "name": "clip.mov", "type": "footage", "source": { "type": "file", "name": "clip.mov" }, "parent": 1 },
                { "name": "Red Solid", "type": "footage", "source": { "type": "solid" } },
                { "name": "Placeholder", "type": "footage" },
                { "name": "Main", "type": "composition", "comment": "final" }
            ]
        }"#;
        let snapshot: ProjectSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.items[0].is_folder());
        assert_eq!(snapshot.items[1].file_name(), Some("clip.mov"));
        assert_eq!(snapshot.items[1].parent, Some(ItemId(1)));
        assert_eq!(
            snapshot.items[2].kind,
            ItemKind::Footage {
                source: Some(FootageSource::Solid)
            }
        );
        assert_eq!(snapshot.items[3].kind, ItemKind::Footage { source: None });
        assert_eq!(snapshot.items[4].comment_or_empty(), "final");
        assert_eq!(snapshot.items[3].comment_or_empty(), "");
    }
}
