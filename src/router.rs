//! Classification and routing.
//!
//! The router walks a [`ProjectSnapshot`] in ascending item order and decides,
//! for every item, which destination category (if any) it moves into.
//! Decisions are pure: nothing is moved here. The resulting [`RoutingPlan`]
//! is turned into host actions by [`crate::project::Organizer`].
//!
//! Per item the procedure is:
//! 1. Folders are never classified.
//! 2. Items matching the exclusion rule stay where they are.
//! 3. Compositions go to the composition bucket, solids to the solid bucket.
//! 4. File footage is tested against video, image and audio extensions in
//!    that order; the last category that matches wins.
//! 5. Anything still unclaimed goes to the other bucket if it is active.
//!
//! # Examples
//!
//! ```
//! use projtidy::category::Category;
//! use projtidy::config::OrganizerConfig;
//! use projtidy::item::ProjectItem;
//! use projtidy::router::classify;
//!
//! let rules = OrganizerConfig::default().compile();
//! assert_eq!(classify(&ProjectItem::file("shot.MOV"), &rules), Some(Category::Video));
//! assert_eq!(classify(&ProjectItem::composition("Main"), &rules), Some(Category::Composition));
//! assert_eq!(classify(&ProjectItem::file("notes.txt"), &rules), Some(Category::Other));
//! ```

use crate::category::Category;
use crate::item::{FootageSource, ItemId, ItemKind, ProjectItem, ProjectSnapshot};
use crate::rules::RuleSet;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Returns the destination category for a non-excluded item.
///
/// Folders always yield `None`. Exclusion is not checked here; use
/// [`Router::decide`] for the full per-item decision.
pub fn classify(item: &ProjectItem, rules: &RuleSet) -> Option<Category> {
    let specific = match &item.kind {
        ItemKind::Folder => return None,
        ItemKind::Composition => claim(rules, Category::Composition),
        ItemKind::Footage {
            source: Some(FootageSource::Solid),
        } => claim(rules, Category::Solid),
        ItemKind::Footage {
            source: Some(FootageSource::File { name }),
        } => classify_file(name, rules),
        ItemKind::Footage { .. } => None,
    };

    specific.or_else(|| claim(rules, Category::Other))
}

/// The last matching media category wins, so overlapping extension lists
/// resolve as audio over image over video.
fn classify_file(file_name: &str, rules: &RuleSet) -> Option<Category> {
    Category::MEDIA
        .into_iter()
        .rev()
        .find(|&category| rules.rule(category).matches_file(file_name))
}

fn claim(rules: &RuleSet, category: Category) -> Option<Category> {
    rules.claims(category).then_some(category)
}

/// What happens to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Moved into the destination of this category.
    Routed(Category),
    /// Matched the exclusion rule and left in place.
    Excluded,
    /// A folder; containers are never classified.
    Folder,
    /// No active rule claimed the item; left in place.
    Unmatched,
}

/// The routing decision for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub item: ItemId,
    pub disposition: Disposition,
}

impl RoutingDecision {
    /// The destination category, or `None` if the item stays put.
    pub fn category(&self) -> Option<Category> {
        match self.disposition {
            Disposition::Routed(category) => Some(category),
            _ => None,
        }
    }
}

/// A single host-side step needed to carry out a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create the destination container for `category`.
    CreateFolder { category: Category, name: String },
    /// Move `item` into the destination container for `category`.
    SetParent { item: ItemId, category: Category },
}

/// The outcome of routing a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingPlan {
    /// Destinations to create, in settings order.
    pub destinations: Vec<(Category, String)>,
    /// One decision per item, in ascending item order.
    pub decisions: Vec<RoutingDecision>,
}

impl RoutingPlan {
    /// Decisions that move an item.
    pub fn routed(&self) -> impl Iterator<Item = (ItemId, Category)> + '_ {
        self.decisions
            .iter()
            .filter_map(|decision| decision.category().map(|category| (decision.item, category)))
    }

    pub fn decision(&self, item: ItemId) -> Option<&RoutingDecision> {
        self.decisions.iter().find(|decision| decision.item == item)
    }

    pub fn destination_name(&self, category: Category) -> Option<&str> {
        self.destinations
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, name)| name.as_str())
    }

    /// Number of routed items per category.
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for (_, category) in self.routed() {
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }

    pub fn excluded_count(&self) -> usize {
        self.count_where(|d| d == Disposition::Excluded)
    }

    pub fn unmatched_count(&self) -> usize {
        self.count_where(|d| d == Disposition::Unmatched)
    }

    fn count_where(&self, predicate: impl Fn(Disposition) -> bool) -> usize {
        self.decisions
            .iter()
            .filter(|decision| predicate(decision.disposition))
            .count()
    }

    /// Host actions in execution order: every folder first, then moves in
    /// item order.
    pub fn actions(&self) -> Vec<Action> {
        let folders = self
            .destinations
            .iter()
            .map(|(category, name)| Action::CreateFolder {
                category: *category,
                name: name.clone(),
            });
        let moves = self
            .routed()
            .map(|(item, category)| Action::SetParent { item, category });
        folders.chain(moves).collect()
    }
}

/// Routes project items according to a borrowed rule set.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    rules: &'a RuleSet,
}

impl<'a> Router<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Full per-item decision: folder check, then exclusion, then classification.
    pub fn decide(&self, item: &ProjectItem) -> Disposition {
        if item.is_folder() {
            return Disposition::Folder;
        }
        if self.rules.exclusion().is_excluded(item) {
            return Disposition::Excluded;
        }
        match classify(item, self.rules) {
            Some(category) => Disposition::Routed(category),
            None => Disposition::Unmatched,
        }
    }

    /// Routes every item of `snapshot` in ascending order.
    pub fn route(&self, snapshot: &ProjectSnapshot) -> RoutingPlan {
        let destinations = self
            .rules
            .active_destinations()
            .map(|(category, name)| (category, name.to_string()))
            .collect();

        let decisions: Vec<RoutingDecision> = snapshot
            .iter()
            .map(|(id, item)| {
                let disposition = self.decide(item);
                debug!(item = %id, name = %item.name, ?disposition, "routing decision");
                RoutingDecision {
                    item: id,
                    disposition,
                }
            })
            .collect();

        let plan = RoutingPlan {
            destinations,
            decisions,
        };
        info!(
            items = snapshot.len(),
            routed = plan.routed().count(),
            excluded = plan.excluded_count(),
            unmatched = plan.unmatched_count(),
            "routing complete"
        );
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryConfig, OrganizerConfig};
    use crate::rules::ExclusionMode;

    fn all_media_match(ext: &str) -> RuleSet {
        OrganizerConfig::empty()
            .with_category(
                Category::Video,
                CategoryConfig::new(true, "Videos").with_extensions(ext),
            )
            .with_category(
                Category::Image,
                CategoryConfig::new(true, "Images").with_extensions(ext),
            )
            .with_category(
                Category::Audio,
                CategoryConfig::new(true, "Audio").with_extensions(ext),
            )
            .compile()
    }

    #[test]
    fn test_composition_routed_when_enabled() {
        let rules = OrganizerConfig::default().compile();
        assert_eq!(
            classify(&ProjectItem::composition("Main"), &rules),
            Some(Category::Composition)
        );
    }

    #[test]
    fn test_composition_falls_back_to_other() {
        let rules = OrganizerConfig::default()
            .with_category(Category::Composition, CategoryConfig::disabled())
            .compile();
        assert_eq!(
            classify(&ProjectItem::composition("Main"), &rules),
            Some(Category::Other)
        );
    }

    #[test]
    fn test_solid_routing() {
        let rules = OrganizerConfig::default().compile();
        assert_eq!(
            classify(&ProjectItem::solid("Black Solid 1"), &rules),
            Some(Category::Solid)
        );

        let rules = OrganizerConfig::default()
            .with_category(Category::Solid, CategoryConfig::disabled())
            .compile();
        assert_eq!(
            classify(&ProjectItem::solid("Black Solid 1"), &rules),
            Some(Category::Other)
        );
    }

    #[test]
    fn test_solid_named_like_video_stays_solid() {
        let rules = OrganizerConfig::default().compile();
        assert_eq!(
            classify(&ProjectItem::solid("bg.mp4"), &rules),
            Some(Category::Solid)
        );
    }

    #[test]
    fn test_footage_by_extension() {
        let rules = OrganizerConfig::default().compile();
        assert_eq!(
            classify(&ProjectItem::file("a.mp4"), &rules),
            Some(Category::Video)
        );
        assert_eq!(
            classify(&ProjectItem::file("b.PNG"), &rules),
            Some(Category::Image)
        );
        assert_eq!(
            classify(&ProjectItem::file("c.wav"), &rules),
            Some(Category::Audio)
        );
    }

    #[test]
    fn test_last_media_match_wins() {
        let rules = all_media_match("dat");
        assert_eq!(
            classify(&ProjectItem::file("x.dat"), &rules),
            Some(Category::Audio)
        );

        let rules = OrganizerConfig::empty()
            .with_category(
                Category::Video,
                CategoryConfig::new(true, "Videos").with_extensions("gif"),
            )
            .with_category(
                Category::Image,
                CategoryConfig::new(true, "Images").with_extensions("gif"),
            )
            .compile();
        assert_eq!(
            classify(&ProjectItem::file("loop.gif"), &rules),
            Some(Category::Image)
        );
    }

    #[test]
    fn test_disabled_media_category_does_not_win() {
        let rules = OrganizerConfig::empty()
            .with_category(
                Category::Video,
                CategoryConfig::new(true, "Videos").with_extensions("dat"),
            )
            .with_category(
                Category::Audio,
                CategoryConfig::new(false, "Audio").with_extensions("dat"),
            )
            .compile();
        assert_eq!(
            classify(&ProjectItem::file("x.dat"), &rules),
            Some(Category::Video)
        );
    }

    #[test]
    fn test_footage_without_file_goes_to_other() {
        let rules = OrganizerConfig::default().compile();
        let placeholder = ProjectItem::new("Missing", ItemKind::Footage { source: None });
        let proxy = ProjectItem::new(
            "Proxy.mp4",
            ItemKind::Footage {
                source: Some(FootageSource::Other),
            },
        );
        assert_eq!(classify(&placeholder, &rules), Some(Category::Other));
        assert_eq!(classify(&proxy, &rules), Some(Category::Other));
    }

    #[test]
    fn test_unmatched_without_other_is_none() {
        let rules = OrganizerConfig::default()
            .with_category(Category::Other, CategoryConfig::disabled())
            .compile();
        assert_eq!(classify(&ProjectItem::file("readme.txt"), &rules), None);
    }

    #[test]
    fn test_enabled_without_destination_is_inert() {
        let rules = OrganizerConfig::default()
            .with_category(
                Category::Video,
                CategoryConfig::new(true, "").with_extensions("mp4"),
            )
            .compile();
        assert_eq!(
            classify(&ProjectItem::file("a.mp4"), &rules),
            Some(Category::Other)
        );
    }

    #[test]
    fn test_folders_never_classified() {
        let rules = OrganizerConfig::default().compile();
        let router = Router::new(&rules);
        assert_eq!(classify(&ProjectItem::folder("Footage"), &rules), None);
        assert_eq!(
            router.decide(&ProjectItem::folder("Footage")),
            Disposition::Folder
        );
    }

    #[test]
    fn test_exclusion_checked_before_classification() {
        let rules = OrganizerConfig::default()
            .with_exclusion(ExclusionMode::Comment, "skip")
            .compile();
        let router = Router::new(&rules);
        let item = ProjectItem::file("a.mp4").with_comment("please skip me");

        assert_eq!(router.decide(&item), Disposition::Excluded);
        assert_eq!(
            router.decide(&ProjectItem::file("a.mp4")),
            Disposition::Routed(Category::Video)
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let rules = all_media_match("mp4");
        let item = ProjectItem::file("clip.mp4");
        assert_eq!(classify(&item, &rules), classify(&item, &rules));
    }

    #[test]
    fn test_route_preserves_item_order() {
        let rules = OrganizerConfig::default().compile();
        let snapshot = ProjectSnapshot::new(vec![
            ProjectItem::folder("Footage"),
            ProjectItem::file("b.wav"),
            ProjectItem::composition("Main"),
            ProjectItem::file("a.mp4"),
        ]);

        let plan = Router::new(&rules).route(&snapshot);
        let ids: Vec<_> = plan.decisions.iter().map(|d| d.item.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let routed: Vec<_> = plan.routed().collect();
        assert_eq!(
            routed,
            vec![
                (ItemId(2), Category::Audio),
                (ItemId(3), Category::Composition),
                (ItemId(4), Category::Video),
            ]
        );
    }

    #[test]
    fn test_plan_actions_create_folders_first() {
        let rules = OrganizerConfig::empty()
            .with_category(
                Category::Video,
                CategoryConfig::new(true, "Videos").with_extensions("mp4,mov"),
            )
            .with_category(Category::Other, CategoryConfig::new(true, "Other"))
            .compile();
        let snapshot =
            ProjectSnapshot::new(vec![ProjectItem::file("a.mp4"), ProjectItem::file("b.txt")]);

        let plan = Router::new(&rules).route(&snapshot);
        assert_eq!(
            plan.actions(),
            vec![
                Action::CreateFolder {
                    category: Category::Video,
                    name: "Videos".to_string()
                },
                Action::CreateFolder {
                    category: Category::Other,
                    name: "Other".to_string()
                },
                Action::SetParent {
                    item: ItemId(1),
                    category: Category::Video
                },
                Action::SetParent {
                    item: ItemId(2),
                    category: Category::Other
                },
            ]
        );
        assert_eq!(plan.destination_name(Category::Video), Some("Videos"));
        assert_eq!(plan.destination_name(Category::Image), None);
    }

    #[test]
    fn test_plan_counts() {
        let rules = OrganizerConfig::default()
            .with_category(Category::Other, CategoryConfig::disabled())
            .with_exclusion(ExclusionMode::Name, "old")
            .compile();
        let snapshot = ProjectSnapshot::new(vec![
            ProjectItem::file("a.mp4"),
            ProjectItem::file("b.mp4"),
            ProjectItem::file("old.mp4"),
            ProjectItem::file("notes.txt"),
            ProjectItem::folder("Bin"),
        ]);

        let plan = Router::new(&rules).route(&snapshot);
        assert_eq!(plan.counts().get(&Category::Video), Some(&2));
        assert_eq!(plan.excluded_count(), 1);
        assert_eq!(plan.unmatched_count(), 1);
        assert_eq!(
            plan.decision(ItemId(5)).map(|d| d.disposition),
            Some(Disposition::Folder)
        );
    }
}
