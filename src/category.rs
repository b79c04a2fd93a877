//! Destination categories for project items.
//!
//! The set is closed: every routed item lands in exactly one of these six
//! buckets. Each category knows its default destination name, its default
//! extension list (for the media categories), and the key prefix used when
//! persisting its settings.
//!
//! # Examples
//!
//! ```
//! use projtidy::category::{Category, ExtensionSet};
//!
//! assert_eq!(Category::Video.default_destination(), "Videos");
//! let video = ExtensionSet::parse(Category::Video.default_extensions().unwrap());
//! assert!(video.matches("CLIP.MP4"));
//! assert!(!video.matches("notes.txt"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Footage backed by a video file.
    Video,
    /// Footage backed by a still image file.
    Image,
    /// Footage backed by an audio file.
    Audio,
    /// Compositions.
    Composition,
    /// Generated solids.
    Solid,
    /// Fallback bucket for anything a more specific category did not claim.
    Other,
}

impl Category {
    /// All categories in settings order. Destinations are created in this order.
    pub const ALL: [Category; 6] = [
        Category::Video,
        Category::Image,
        Category::Audio,
        Category::Composition,
        Category::Solid,
        Category::Other,
    ];

    /// Categories that match footage by file extension, in evaluation order.
    pub const MEDIA: [Category; 3] = [Category::Video, Category::Image, Category::Audio];

    /// Position of this category in [`Category::ALL`].
    pub(crate) fn index(self) -> usize {
        match self {
            Category::Video => 0,
            Category::Image => 1,
            Category::Audio => 2,
            Category::Composition => 3,
            Category::Solid => 4,
            Category::Other => 5,
        }
    }

    /// Returns the destination name used when none is configured.
    pub fn default_destination(&self) -> &'static str {
        match self {
            Category::Video => "Videos",
            Category::Image => "Images",
            Category::Audio => "Audio",
            Category::Composition => "Comp",
            Category::Solid => "Solid",
            Category::Other => "Other",
        }
    }

    /// Returns the default comma-separated extension list, if this category
    /// matches by extension at all.
    pub fn default_extensions(&self) -> Option<&'static str> {
        match self {
            Category::Video => Some("mp4,mov,avi,mkv"),
            Category::Image => Some("jpg,jpeg,png,gif,tif,bmp"),
            Category::Audio => Some("mp3,wav,aiff,aac"),
            Category::Composition | Category::Solid | Category::Other => None,
        }
    }

    /// Whether this category carries an extension matcher.
    pub fn has_extensions(&self) -> bool {
        self.default_extensions().is_some()
    }

    /// Returns the prefix of this category's persisted settings keys.
    ///
    /// ```
    /// use projtidy::category::Category;
    ///
    /// assert_eq!(Category::Composition.settings_key(), "Comp");
    /// assert_eq!(Category::Video.settings_key(), "Videos");
    /// ```
    pub fn settings_key(&self) -> &'static str {
        match self {
            Category::Video => "Videos",
            Category::Image => "Images",
            Category::Audio => "Audio",
            Category::Composition => "Comp",
            Category::Solid => "Solid",
            Category::Other => "Other",
        }
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Video => "Video footage",
            Category::Image => "Image footage",
            Category::Audio => "Audio footage",
            Category::Composition => "Compositions",
            Category::Solid => "Solids",
            Category::Other => "Other items",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Video => "video",
            Category::Image => "image",
            Category::Audio => "audio",
            Category::Composition => "composition",
            Category::Solid => "solid",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

/// A normalized set of file-suffix matchers.
///
/// Entries are lower-cased and trimmed; empty entries are dropped, so an
/// empty or blank list never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: Vec<String>,
}

impl ExtensionSet {
    /// Parses a comma-separated extension list such as `"mp4, MOV,avi"`.
    pub fn parse(list: &str) -> Self {
        let mut extensions: Vec<String> = Vec::new();
        for raw in list.split(',') {
            let ext = raw.trim().to_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        Self { extensions }
    }

    /// Returns true if `file_name` ends with any extension in the set.
    ///
    /// Comparison is a raw case-insensitive suffix test. No dot is implied, so
    /// `"mp4"` also matches `"sitemp4"`.
    ///
    /// ```
    /// use projtidy::category::ExtensionSet;
    ///
    /// let set = ExtensionSet::parse("mp4");
    /// assert!(set.matches("a.mp4"));
    /// assert!(set.matches("sitemp4"));
    /// ```
    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}
