//! Curriculum aggregate views: content tree plus progress in one response.
//!
//! These are the page-load endpoints: a topic page, a category page, or a
//! section page each need their slice of the tree and the caller's
//! completion state together.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use storage::repository::{CompletionRepository, ContentRepository};
use trailhead_core::model::{Category, Difficulty, Identity, Section, Slug, Topic};

use crate::error::{EntityKind, ProgressError};
use crate::progress::rollup::{CompletionSet, category_completion_map, percentage};
use crate::progress::view::TopicStats;

/// Content passthrough for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub order: u32,
}

impl TopicSummary {
    fn from_topic(topic: &Topic) -> Self {
        Self {
            slug: topic.slug().as_str().to_owned(),
            name: topic.name().to_owned(),
            description: topic.description().to_owned(),
            icon: topic.icon().to_owned(),
            order: topic.order(),
        }
    }
}

/// Content passthrough for a category. `group` drives UI tabs only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub slug: String,
    pub name: String,
    pub order: u32,
    pub group: String,
}

impl CategorySummary {
    fn from_category(category: &Category) -> Self {
        Self {
            slug: category.slug().as_str().to_owned(),
            name: category.name().to_owned(),
            order: category.order(),
            group: category.group().to_owned(),
        }
    }
}

/// Content passthrough for a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub slug: String,
    pub title: String,
    pub order: u32,
    pub difficulty: Difficulty,
}

impl SectionSummary {
    fn from_section(section: &Section) -> Self {
        Self {
            slug: section.slug().as_str().to_owned(),
            title: section.title().to_owned(),
            order: section.order(),
            difficulty: section.difficulty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAggregateView {
    pub topic: TopicSummary,
    pub categories: Vec<CategorySummary>,
    pub sections: Vec<SectionSummary>,
    pub progress: BTreeMap<String, bool>,
    pub stats: TopicStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregateView {
    pub topic: TopicSummary,
    pub category: CategorySummary,
    pub sections: Vec<SectionSummary>,
    pub progress: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAggregateView {
    pub topic: TopicSummary,
    pub category: Option<CategorySummary>,
    pub section: SectionSummary,
    /// All of the topic's sections, for sidebar navigation.
    pub all_topic_sections: Vec<SectionSummary>,
    pub is_completed: bool,
}

/// Read-only aggregate views over the content tree and completion store.
#[derive(Clone)]
pub struct CurriculumService {
    content: Arc<dyn ContentRepository>,
    completions: Arc<dyn CompletionRepository>,
}

impl CurriculumService {
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

    /// Topic page payload: tree slice, category roll-up map, stats.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown topic slug, `Storage` on store failure.
    pub async fn topic_aggregate(
        &self,
        identity: Option<&Identity>,
        topic_slug: &str,
    ) -> Result<TopicAggregateView, ProgressError> {
        let topic = self.require_topic(topic_slug).await?;

        let (categories, sections) = tokio::join!(
            self.content.list_categories_for_topic(topic.id()),
            self.content.list_sections_for_topic(topic.id()),
        );
        let (categories, sections) = (categories?, sections?);

        let completed = self.completed_for(identity, &sections).await?;
        let progress = category_completion_map(&categories, &sections, &completed);

        Ok(TopicAggregateView {
            topic: TopicSummary::from_topic(&topic),
            categories: categories.iter().map(CategorySummary::from_category).collect(),
            sections: sections.iter().map(SectionSummary::from_section).collect(),
            progress,
            stats: TopicStats {
                total_sections: sections.len(),
                completed_sections: completed.len(),
                percentage: percentage(completed.len(), sections.len()),
            },
        })
    }

    /// Category page payload: tree slice plus per-section completion map.
    ///
    /// # Errors
    ///
    /// `NotFound` naming the level that failed, `Storage` on store failure.
    pub async fn category_aggregate(
        &self,
        identity: Option<&Identity>,
        topic_slug: &str,
        category_slug: &str,
    ) -> Result<CategoryAggregateView, ProgressError> {
        let topic = self.require_topic(topic_slug).await?;

        let slug = Slug::parse(category_slug)?;
        let category = self
            .content
            .find_category_by_slug(topic.id(), &slug)
            .await?
            .ok_or_else(|| ProgressError::not_found(EntityKind::Category, slug.as_str()))?;

        let sections = self.content.list_sections_for_category(category.id()).await?;
        let completed = self.completed_for(identity, &sections).await?;

        let progress = sections
            .iter()
            .map(|s| (s.slug().as_str().to_owned(), completed.contains(s.id())))
            .collect();

        Ok(CategoryAggregateView {
            topic: TopicSummary::from_topic(&topic),
            category: CategorySummary::from_category(&category),
            sections: sections.iter().map(SectionSummary::from_section).collect(),
            progress,
        })
    }

    /// Section page payload: the section, its parents, the topic's full
    /// section list for the sidebar, and the caller's completion flag.
    ///
    /// The section lookup is topic-scoped here, unlike toggle's global
    /// lookup: the page always knows its topic.
    ///
    /// # Errors
    ///
    /// `NotFound` naming the level that failed, `Storage` on store failure.
    pub async fn section_aggregate(
        &self,
        identity: Option<&Identity>,
        topic_slug: &str,
        section_slug: &str,
    ) -> Result<SectionAggregateView, ProgressError> {
        let topic = self.require_topic(topic_slug).await?;

        let slug = Slug::parse(section_slug)?;
        let section = self
            .content
            .find_section_in_topic(topic.id(), &slug)
            .await?
            .ok_or_else(|| ProgressError::not_found(EntityKind::Section, slug.as_str()))?;

        let (categories, all_topic_sections) = tokio::join!(
            self.content.list_categories_for_topic(topic.id()),
            self.content.list_sections_for_topic(topic.id()),
        );
        let (categories, all_topic_sections) = (categories?, all_topic_sections?);

        // Dangling category ids resolve to None rather than erroring.
        let category = section
            .category_id()
            .and_then(|id| categories.iter().find(|c| c.id() == id))
            .map(CategorySummary::from_category);

        let is_completed = match identity {
            None => false,
            Some(identity) => self
                .completions
                .find(identity.storage_key(), section.id())
                .await?
                .is_some_and(|r| r.completed()),
        };

        Ok(SectionAggregateView {
            topic: TopicSummary::from_topic(&topic),
            category,
            section: SectionSummary::from_section(&section),
            all_topic_sections: all_topic_sections
                .iter()
                .map(SectionSummary::from_section)
                .collect(),
            is_completed,
        })
    }

    async fn require_topic(&self, raw: &str) -> Result<Topic, ProgressError> {
        let slug = Slug::parse(raw)?;
        self.content
            .find_topic_by_slug(&slug)
            .await?
            .ok_or_else(|| ProgressError::not_found(EntityKind::Topic, slug.as_str()))
    }

    async fn completed_for(
        &self,
        identity: Option<&Identity>,
        sections: &[Section],
    ) -> Result<CompletionSet, ProgressError> {
        let Some(identity) = identity else {
            return Ok(CompletionSet::empty());
        };
        let ids: Vec<_> = sections.iter().map(|s| s.id().clone()).collect();
        let records = self
            .completions
            .list_for_sections(identity.storage_key(), &ids)
            .await?;
        Ok(CompletionSet::from_records(&records))
    }
}
