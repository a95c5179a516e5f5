//! Shared roll-up helpers for completion aggregation.
//!
//! Every aggregate view funnels through these: completion records become a
//! [`CompletionSet`] keyed by canonical section-id strings, and the per-level
//! statistics derive from that single representation. Record-to-section
//! identity matching happens here and nowhere else.

use std::collections::{BTreeMap, HashSet};

use trailhead_core::model::{Category, CompletionRecord, Section, SectionId};

/// The set of section ids a user has completed, in canonical string form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    completed: HashSet<String>,
}

impl CompletionSet {
    /// An empty set; what anonymous aggregation works against.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the set from a batch of records, keeping only the completed
    /// ones.
    #[must_use]
    pub fn from_records(records: &[CompletionRecord]) -> Self {
        Self {
            completed: records
                .iter()
                .filter(|r| r.completed())
                .map(|r| r.section_id().as_str().to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, section_id: &SectionId) -> bool {
        self.completed.contains(section_id.as_str())
    }

    /// Number of completed sections in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

/// All-or-nothing category roll-up.
///
/// A category with zero sections counts as NOT completed. That is a product
/// convention, not vacuous truth: an empty category must never read as done.
#[must_use]
pub fn category_completed(sections: &[&Section], completed: &CompletionSet) -> bool {
    if sections.is_empty() {
        return false;
    }
    sections.iter().all(|s| completed.contains(s.id()))
}

/// Builds the `{categorySlug: completed}` map for a topic view.
///
/// Sections without a category never satisfy any roll-up; they simply do
/// not appear in any category's section list.
#[must_use]
pub fn category_completion_map(
    categories: &[Category],
    sections: &[Section],
    completed: &CompletionSet,
) -> BTreeMap<String, bool> {
    categories
        .iter()
        .map(|category| {
            let category_sections: Vec<&Section> = sections
                .iter()
                .filter(|s| s.category_id() == Some(category.id()))
                .collect();
            (
                category.slug().as_str().to_owned(),
                category_completed(&category_sections, completed),
            )
        })
        .collect()
}

/// Completion percentage, rounded to the nearest whole number.
///
/// Zero total yields zero, never a division error.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round();
    pct.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailhead_core::model::{CategoryId, Difficulty, Slug, TopicId};
    use trailhead_core::time::fixed_now;

    fn build_section(id: &str, category: Option<&str>) -> Section {
        Section::new(
            SectionId::new(id),
            TopicId::new("t-1"),
            category.map(CategoryId::new),
            Slug::parse(format!("sec-{id}")).unwrap(),
            format!("Section {id}"),
            1,
            Difficulty::Beginner,
        )
        .unwrap()
    }

    fn build_category(id: &str, slug: &str, order: u32) -> Category {
        Category::new(
            CategoryId::new(id),
            TopicId::new("t-1"),
            Slug::parse(slug).unwrap(),
            slug,
            order,
            "general",
        )
        .unwrap()
    }

    fn completed_set(ids: &[&str]) -> CompletionSet {
        let records: Vec<CompletionRecord> = ids
            .iter()
            .map(|id| {
                CompletionRecord::new("user-1", SectionId::new(*id), true, fixed_now()).unwrap()
            })
            .collect();
        CompletionSet::from_records(&records)
    }

    #[test]
    fn set_only_keeps_completed_records() {
        let records = vec![
            CompletionRecord::new("user-1", SectionId::new("s-1"), true, fixed_now()).unwrap(),
            CompletionRecord::new("user-1", SectionId::new("s-2"), false, fixed_now()).unwrap(),
        ];
        let set = CompletionSet::from_records(&records);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&SectionId::new("s-1")));
        assert!(!set.contains(&SectionId::new("s-2")));
    }

    #[test]
    fn empty_category_rolls_up_to_false() {
        assert!(!category_completed(&[], &completed_set(&["s-1"])));
    }

    #[test]
    fn category_completed_is_all_or_nothing() {
        let a = build_section("s-1", Some("c-1"));
        let b = build_section("s-2", Some("c-1"));
        let sections = vec![&a, &b];

        assert!(category_completed(&sections, &completed_set(&["s-1", "s-2"])));
        assert!(!category_completed(&sections, &completed_set(&["s-1"])));
        assert!(!category_completed(&sections, &CompletionSet::empty()));
    }

    #[test]
    fn completion_map_ignores_categoryless_sections() {
        let categories = vec![build_category("c-1", "basics", 1)];
        let sections = vec![
            build_section("s-1", Some("c-1")),
            build_section("s-2", None),
        ];

        let map = category_completion_map(&categories, &sections, &completed_set(&["s-1"]));
        assert_eq!(map.get("basics"), Some(&true));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn percentage_handles_zero_total() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(3, 10), 30);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(10, 10), 100);
    }

    #[test]
    fn percentage_stays_within_bounds() {
        assert_eq!(percentage(20, 10), 100);
    }
}
