//! Next-step resolution: where "continue learning" should land.

use std::collections::HashMap;

use trailhead_core::model::{Category, Section, Topic};

use crate::progress::rollup::CompletionSet;

/// Returns the deep link for the first incomplete section of a topic, or
/// the topic root when everything is complete or nothing is resolvable.
///
/// Sections are walked in (category order, section order). A section whose
/// `category_id` is absent or no longer resolves cannot be linked, so it is
/// skipped; that is logged rather than failing the whole view over one bad
/// pointer. Deterministic for fixed inputs.
#[must_use]
pub fn resolve_next_step(
    topic: &Topic,
    categories: &[Category],
    sections: &[Section],
    completed: &CompletionSet,
) -> String {
    let by_id: HashMap<&str, &Category> = categories
        .iter()
        .map(|c| (c.id().as_str(), c))
        .collect();

    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|s| {
        let category_order = s
            .category_id()
            .and_then(|id| by_id.get(id.as_str()))
            .map_or(u32::MAX, |c| c.order());
        (category_order, s.order())
    });

    for section in ordered {
        if completed.contains(section.id()) {
            continue;
        }
        let Some(category) = section.category_id().and_then(|id| by_id.get(id.as_str())) else {
            tracing::warn!(
                topic = topic.slug().as_str(),
                section = section.slug().as_str(),
                "skipping section with unresolvable category during next-step resolution"
            );
            continue;
        };
        return format!(
            "/topic/{}/category/{}/section/{}",
            topic.slug(),
            category.slug(),
            section.slug()
        );
    }

    format!("/topic/{}", topic.slug())
}
