//! Topic recommendations: rank wholly-unstarted topics against the static
//! prerequisite graph and the user's per-topic progress ratios.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use storage::repository::{CompletionRepository, ContentRepository};
use trailhead_core::model::{Identity, SectionId, Topic, TopicId};

use crate::error::RecommendError;
use crate::recommend::paths::{INTERVIEW_TOPIC, LearningPath, TRENDING_SKILLS, learning_path};

/// One recommendation item, capped at three per response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub reason: String,
}

/// Per-topic progress ratio derived from the user's records.
#[derive(Debug, Clone, Copy, Default)]
struct TopicRatio {
    completed: usize,
    total: usize,
}

impl TopicRatio {
    /// Percentage of the user's records for the topic that are completed.
    /// Zero when the user has no records at all.
    fn percent(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                self.completed as f64 / self.total as f64 * 100.0
            }
        }
    }
}

/// Ranks not-yet-started topics for an identity.
#[derive(Clone)]
pub struct RecommendationService {
    content: Arc<dyn ContentRepository>,
    completions: Arc<dyn CompletionRepository>,
}

impl RecommendationService {
    #[must_use]
    pub fn new(
        content: Arc<dyn ContentRepository>,
        completions: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            content,
            completions,
        }
    }

    /// Top-3 recommended topics with human-readable reasons.
    ///
    /// Topics the user has touched at all (progress ratio strictly above
    /// zero) are excluded outright. Of the rest, a topic survives only if
    /// every prerequisite sits strictly above 50% progress; prerequisites
    /// not present in the topic collection count as satisfied. An empty
    /// topic collection yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// `Storage` on store failure.
    pub async fn recommendations(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let topics = self.content.list_topics().await?;
        if topics.is_empty() {
            return Ok(Vec::new());
        }

        let ratios = self.topic_ratios(identity).await?;
        let topic_by_slug: HashMap<&str, &Topic> =
            topics.iter().map(|t| (t.slug().as_str(), t)).collect();

        let mut scored: Vec<(i32, &Topic, LearningPath)> = Vec::new();
        for topic in &topics {
            let percent = ratios
                .get(topic.id())
                .copied()
                .unwrap_or_default()
                .percent();
            if percent > 0.0 {
                continue;
            }

            let path = learning_path(topic.slug().as_str());
            let prereqs_met = path.prereqs.iter().all(|prereq| {
                let Some(prereq_topic) = topic_by_slug.get(prereq) else {
                    return true;
                };
                ratios
                    .get(prereq_topic.id())
                    .copied()
                    .unwrap_or_default()
                    .percent()
                    > 50.0
            });
            if !prereqs_met {
                continue;
            }

            // The +30 prereqs-met boost is constant for everything that
            // reaches scoring; it is kept so the formula survives intact if
            // unmet-prerequisite candidates ever re-enter the pool.
            let score = 100 - i32::from(path.difficulty) * 10
                + 30
                + i32::try_from(path.prereqs.len()).unwrap_or(0) * 5;
            scored.push((score, topic, path));
        }

        // Stable sort over the order-sorted topic list keeps ties
        // deterministic.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(3)
            .map(|(_, topic, path)| Recommendation {
                slug: topic.slug().as_str().to_owned(),
                name: topic.name().to_owned(),
                description: topic.description().to_owned(),
                icon: topic.icon().to_owned(),
                reason: build_reason(topic, path),
            })
            .collect())
    }

    /// Groups the identity's records by topic via one batch section
    /// lookup. Records whose section no longer resolves are skipped.
    async fn topic_ratios(
        &self,
        identity: Option<&Identity>,
    ) -> Result<HashMap<TopicId, TopicRatio>, RecommendError> {
        let Some(identity) = identity else {
            return Ok(HashMap::new());
        };

        let records = self
            .completions
            .list_for_user(identity.storage_key())
            .await?;
        if records.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<SectionId> = records.iter().map(|r| r.section_id().clone()).collect();
        let sections = self.content.get_sections_by_ids(&ids).await?;
        let section_topic: HashMap<&str, &TopicId> = sections
            .iter()
            .map(|s| (s.id().as_str(), s.topic_id()))
            .collect();

        let mut ratios: HashMap<TopicId, TopicRatio> = HashMap::new();
        for record in &records {
            let Some(topic_id) = section_topic.get(record.section_id().as_str()) else {
                tracing::warn!(
                    section_id = record.section_id().as_str(),
                    "skipping completion record with unresolvable section"
                );
                continue;
            };
            let ratio = ratios.entry((*topic_id).clone()).or_default();
            ratio.total += 1;
            if record.completed() {
                ratio.completed += 1;
            }
        }
        Ok(ratios)
    }
}

fn build_reason(topic: &Topic, path: LearningPath) -> String {
    let mut reasons: Vec<&str> = Vec::new();

    if path.difficulty == 1 {
        reasons.push("Perfect for beginners");
    } else if path.difficulty == 2 {
        reasons.push("Great next step");
    }

    if !path.prereqs.is_empty() {
        reasons.push("You've completed the prerequisites");
    }

    if TRENDING_SKILLS.contains(&topic.slug().as_str()) {
        reasons.push("Highly in-demand skill");
    }

    if topic.slug().as_str() == INTERVIEW_TOPIC {
        reasons.push("Essential for interviews");
    }

    if reasons.is_empty() {
        "Recommended for you".to_owned()
    } else {
        reasons.join(" • ")
    }
}
