//! The completion aggregator: toggles, per-scope progress views, and the
//! all-topics dashboard.

use std::collections::HashMap;
use std::sync::Arc;

use storage::repository::{CompletionRepository, ContentRepository};
use trailhead_core::Clock;
use trailhead_core::model::{
    Category, CompletionRecord, Identity, Section, SectionId, Slug, Topic, TopicId,
};

use crate::error::{EntityKind, ProgressError};
use crate::next_step::resolve_next_step;
use crate::progress::rollup::{CompletionSet, category_completion_map, percentage};
use crate::progress::view::{
    AllTopicsProgress, CategoryProgressView, EndSessionRequest, RecordTimeRequest,
    SectionProgressView, SessionClosedView, StudySessionView, TimeSpentView, ToggleOutcome,
    ToggleSectionRequest, TopicProgressSummary, TopicProgressView, TopicStats,
};

/// Orchestrates completion reads and writes over the content tree.
///
/// Read operations take `Option<&Identity>`: `None` is the fully
/// unidentified path (all-false maps, zero stats, no completion query at
/// all), while `Some(Identity::Anonymous)` reads the shared sentinel
/// bucket. Writes always require an identity since every record needs a
/// partition key.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    content: Arc<dyn ContentRepository>,
    completions: Arc<dyn CompletionRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn ContentRepository>,
        completions: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            clock,
            content,
            completions,
        }
    }

    /// Set or clear a section's completion flag for the given identity.
    ///
    /// Idempotent: repeating the same toggle leaves the same single record
    /// behind. Last write wins when two toggles race.
    ///
    /// # Errors
    ///
    /// `MissingField`/`InvalidSlug` for a bad request body, `NotFound` for
    /// an unknown section slug, `Storage` if the store fails.
    pub async fn toggle_section(
        &self,
        identity: &Identity,
        request: &ToggleSectionRequest,
    ) -> Result<ToggleOutcome, ProgressError> {
        let section = self
            .require_section(request.section_slug.as_deref())
            .await?;
        let now = self.clock.now();

        let mut record = self.find_or_create(identity, section.id(), now).await?;
        record.set_completed(request.completed, now);
        self.completions.upsert(&record).await?;

        Ok(ToggleOutcome {
            is_completed: record.completed(),
        })
    }

    /// Completion state of a single section.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown section slug, `Storage` on store failure.
    pub async fn section_progress(
        &self,
        identity: Option<&Identity>,
        section_slug: &str,
    ) -> Result<SectionProgressView, ProgressError> {
        let section = self.require_section(Some(section_slug)).await?;

        let is_completed = match identity {
            None => false,
            Some(identity) => self
                .completions
                .find(identity.storage_key(), section.id())
                .await?
                .is_some_and(|r| r.completed()),
        };

        Ok(SectionProgressView { is_completed })
    }

    /// Per-section completion map for one category.
    ///
    /// # Errors
    ///
    /// `NotFound` naming the level that failed to resolve, `Storage` on
    /// store failure.
    pub async fn category_progress(
        &self,
        identity: Option<&Identity>,
        topic_slug: &str,
        category_slug: &str,
    ) -> Result<CategoryProgressView, ProgressError> {
        let topic = self.require_topic(topic_slug).await?;
        let category = self.require_category(topic.id(), category_slug).await?;
        let sections = self.content.list_sections_for_category(category.id()).await?;

        let completed = self.completed_for(identity, &sections).await?;
        let progress = sections
            .iter()
            .map(|s| (s.slug().as_str().to_owned(), completed.contains(s.id())))
            .collect();

        Ok(CategoryProgressView { progress })
    }

    /// Per-category roll-up map plus numeric stats for one topic.
    ///
    /// Categories and sections are independent queries and run
    /// concurrently; the completion batch needs the section id set and runs
    /// after.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown topic slug, `Storage` on store failure.
    pub async fn topic_progress(
        &self,
        identity: Option<&Identity>,
        topic_slug: &str,
    ) -> Result<TopicProgressView, ProgressError> {
        let topic = self.require_topic(topic_slug).await?;

        let (categories, sections) = tokio::join!(
            self.content.list_categories_for_topic(topic.id()),
            self.content.list_sections_for_topic(topic.id()),
        );
        let (categories, sections) = (categories?, sections?);

        let completed = self.completed_for(identity, &sections).await?;
        let progress = category_completion_map(&categories, &sections, &completed);

        Ok(TopicProgressView {
            progress,
            stats: TopicStats {
                total_sections: sections.len(),
                completed_sections: completed.len(),
                percentage: percentage(completed.len(), sections.len()),
            },
        })
    }

    /// The all-topics dashboard: stats plus a continue link per topic.
    ///
    /// Topics, categories, sections, and the user's records are four
    /// independent fetches run concurrently, then grouped in memory with no
    /// per-topic queries.
    ///
    /// # Errors
    ///
    /// `Storage` on store failure.
    pub async fn all_topics_progress(
        &self,
        identity: Option<&Identity>,
    ) -> Result<AllTopicsProgress, ProgressError> {
        let (topics, categories, sections, records) = tokio::join!(
            self.content.list_topics(),
            self.content.list_categories(),
            self.content.list_sections(),
            self.list_records(identity),
        );
        let (topics, categories, sections, records) = (topics?, categories?, sections?, records?);

        let mut sections_by_topic: HashMap<&TopicId, Vec<Section>> = HashMap::new();
        for section in &sections {
            sections_by_topic
                .entry(section.topic_id())
                .or_default()
                .push(section.clone());
        }
        let mut categories_by_topic: HashMap<&TopicId, Vec<Category>> = HashMap::new();
        for category in &categories {
            categories_by_topic
                .entry(category.topic_id())
                .or_default()
                .push(category.clone());
        }
        let section_topic: HashMap<&str, &TopicId> = sections
            .iter()
            .map(|s| (s.id().as_str(), s.topic_id()))
            .collect();

        // Orphaned records have no resolvable section and fall out here.
        let mut records_by_topic: HashMap<&TopicId, Vec<CompletionRecord>> = HashMap::new();
        for record in &records {
            if let Some(topic_id) = section_topic.get(record.section_id().as_str()) {
                records_by_topic
                    .entry(topic_id)
                    .or_default()
                    .push(record.clone());
            }
        }

        let empty_sections: Vec<Section> = Vec::new();
        let empty_categories: Vec<Category> = Vec::new();

        let summaries = topics
            .iter()
            .map(|topic| {
                let topic_sections =
                    sections_by_topic.get(topic.id()).unwrap_or(&empty_sections);
                let topic_categories =
                    categories_by_topic.get(topic.id()).unwrap_or(&empty_categories);
                let completed = records_by_topic
                    .get(topic.id())
                    .map_or_else(CompletionSet::empty, |r| CompletionSet::from_records(r));

                TopicProgressSummary {
                    topic_slug: topic.slug().as_str().to_owned(),
                    topic_name: topic.name().to_owned(),
                    icon: topic.icon().to_owned(),
                    total_sections: topic_sections.len(),
                    completed_sections: completed.len(),
                    percentage: percentage(completed.len(), topic_sections.len()),
                    continue_link: resolve_next_step(
                        topic,
                        topic_categories,
                        topic_sections,
                        &completed,
                    ),
                }
            })
            .collect();

        Ok(AllTopicsProgress { topics: summaries })
    }

    /// Add study minutes to a section's record, creating it on first use.
    ///
    /// # Errors
    ///
    /// `MissingField`/`InvalidSlug` for a bad request body, `NotFound` for
    /// an unknown section slug, `Storage` on store failure.
    pub async fn record_time(
        &self,
        identity: &Identity,
        request: &RecordTimeRequest,
    ) -> Result<TimeSpentView, ProgressError> {
        let section = self
            .require_section(request.section_slug.as_deref())
            .await?;
        let now = self.clock.now();

        let mut record = self
            .find_or_create(identity, section.id(), now)
            .await?;
        record.add_time(request.minutes, now);
        self.completions.upsert(&record).await?;

        Ok(TimeSpentView {
            time_spent_minutes: record.time_spent_minutes(),
        })
    }

    /// Open a study session on a section, creating the record on first use.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown section slug, `Storage` on store failure.
    pub async fn start_study_session(
        &self,
        identity: &Identity,
        section_slug: &str,
    ) -> Result<StudySessionView, ProgressError> {
        let section = self.require_section(Some(section_slug)).await?;
        let now = self.clock.now();

        let mut record = self.find_or_create(identity, section.id(), now).await?;
        record.begin_session(now);
        self.completions.upsert(&record).await?;

        Ok(StudySessionView { session_start: now })
    }

    /// Close a study session, crediting the elapsed time in whole minutes.
    ///
    /// Unlike the other write paths this one needs an existing record: a
    /// session cannot end if it was never started.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` when no record exists, otherwise as
    /// [`record_time`](Self::record_time).
    pub async fn end_study_session(
        &self,
        identity: &Identity,
        request: &EndSessionRequest,
    ) -> Result<SessionClosedView, ProgressError> {
        let section = self
            .require_section(request.section_slug.as_deref())
            .await?;
        let now = self.clock.now();

        let mut record = self
            .completions
            .find(identity.storage_key(), section.id())
            .await?
            .ok_or(ProgressError::SessionNotFound)?;

        let added = record.close_session(request.duration, now);
        self.completions.upsert(&record).await?;

        Ok(SessionClosedView {
            total_time_spent: record.time_spent_minutes(),
            session_duration: added,
        })
    }

    // ── resolution helpers ─────────────────────────────────────────────

    async fn require_topic(&self, raw: &str) -> Result<Topic, ProgressError> {
        let slug = Slug::parse(raw)?;
        self.content
            .find_topic_by_slug(&slug)
            .await?
            .ok_or_else(|| ProgressError::not_found(EntityKind::Topic, slug.as_str()))
    }

    async fn require_category(
        &self,
        topic_id: &TopicId,
        raw: &str,
    ) -> Result<Category, ProgressError> {
        let slug = Slug::parse(raw)?;
        self.content
            .find_category_by_slug(topic_id, &slug)
            .await?
            .ok_or_else(|| ProgressError::not_found(EntityKind::Category, slug.as_str()))
    }

    async fn require_section(&self, raw: Option<&str>) -> Result<Section, ProgressError> {
        let raw = raw
            .filter(|s| !s.trim().is_empty())
            .ok_or(ProgressError::MissingField("sectionSlug"))?;
        let slug = Slug::parse(raw)?;
        self.content
            .find_section_by_slug(&slug)
            .await?
            .ok_or_else(|| ProgressError::not_found(EntityKind::Section, slug.as_str()))
    }

    async fn find_or_create(
        &self,
        identity: &Identity,
        section_id: &SectionId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<CompletionRecord, ProgressError> {
        match self
            .completions
            .find(identity.storage_key(), section_id)
            .await?
        {
            Some(record) => Ok(record),
            None => CompletionRecord::new(identity.storage_key(), section_id.clone(), false, now)
                .map_err(|_| ProgressError::MissingField("identity")),
        }
    }

    /// One batch fetch for the given sections, or the empty set when no
    /// identity was supplied.
    pub(crate) async fn completed_for(
        &self,
        identity: Option<&Identity>,
        sections: &[Section],
    ) -> Result<CompletionSet, ProgressError> {
        let Some(identity) = identity else {
            return Ok(CompletionSet::empty());
        };
        let ids: Vec<SectionId> = sections.iter().map(|s| s.id().clone()).collect();
        let records = self
            .completions
            .list_for_sections(identity.storage_key(), &ids)
            .await?;
        Ok(CompletionSet::from_records(&records))
    }

    async fn list_records(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<CompletionRecord>, ProgressError> {
        match identity {
            None => Ok(Vec::new()),
            Some(identity) => Ok(self
                .completions
                .list_for_user(identity.storage_key())
                .await?),
        }
    }
}
