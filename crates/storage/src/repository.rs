use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trailhead_core::model::{
    Category, CategoryId, CompletionRecord, Section, SectionId, Slug, Topic, TopicId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the curriculum content tree.
///
/// The tree is read-mostly: aggregation never writes it, but inserts exist
/// for content loaders and tests. Every listing comes back sorted by the
/// entity's `order` field so callers never re-sort.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Persist a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a topic with the same slug
    /// already exists.
    async fn insert_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// Persist a category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on a duplicate category slug.
    async fn insert_category(&self, category: &Category) -> Result<(), StorageError>;

    /// Persist a section.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the (topic, slug) pair already
    /// exists.
    async fn insert_section(&self, section: &Section) -> Result<(), StorageError>;

    /// Fetch a topic by slug. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn find_topic_by_slug(&self, slug: &Slug) -> Result<Option<Topic>, StorageError>;

    /// List all topics ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError>;

    /// Fetch a category by slug within a topic. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn find_category_by_slug(
        &self,
        topic_id: &TopicId,
        slug: &Slug,
    ) -> Result<Option<Category>, StorageError>;

    /// List a topic's categories ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_categories_for_topic(
        &self,
        topic_id: &TopicId,
    ) -> Result<Vec<Category>, StorageError>;

    /// List every category across all topics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    /// Fetch a section by slug regardless of topic. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn find_section_by_slug(&self, slug: &Slug) -> Result<Option<Section>, StorageError>;

    /// Fetch a section by slug within a topic. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn find_section_in_topic(
        &self,
        topic_id: &TopicId,
        slug: &Slug,
    ) -> Result<Option<Section>, StorageError>;

    /// List a topic's sections ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_sections_for_topic(
        &self,
        topic_id: &TopicId,
    ) -> Result<Vec<Section>, StorageError>;

    /// List a category's sections ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_sections_for_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Section>, StorageError>;

    /// List every section across all topics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_sections(&self) -> Result<Vec<Section>, StorageError>;

    /// Fetch sections by id set, returning only the ids that exist.
    ///
    /// Missing ids are not an error: callers use the gap to drop
    /// completion records whose section no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn get_sections_by_ids(&self, ids: &[SectionId]) -> Result<Vec<Section>, StorageError>;
}

/// Repository contract for per-user completion records.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Fetch the record for one (user, section) pair. `Ok(None)` when the
    /// user has never interacted with the section.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn find(
        &self,
        user_key: &str,
        section_id: &SectionId,
    ) -> Result<Option<CompletionRecord>, StorageError>;

    /// List every record a user has, across all sections.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_for_user(&self, user_key: &str) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Batch fetch of a user's records for a section id set.
    ///
    /// All aggregation goes through this single query; per-section lookups
    /// in a loop are not part of the contract.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_for_sections(
        &self,
        user_key: &str,
        section_ids: &[SectionId],
    ) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Insert or replace the record keyed by (user, section).
    ///
    /// Last write wins; there is no version check.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert(&self, record: &CompletionRecord) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    topics: Arc<Mutex<Vec<Topic>>>,
    categories: Arc<Mutex<Vec<Category>>>,
    sections: Arc<Mutex<Vec<Section>>>,
    completions: Arc<Mutex<HashMap<(String, SectionId), CompletionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn insert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut guard = self.topics.lock().map_err(lock_err)?;
        if guard.iter().any(|t| t.slug() == topic.slug()) {
            return Err(StorageError::Conflict);
        }
        guard.push(topic.clone());
        Ok(())
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StorageError> {
        let mut guard = self.categories.lock().map_err(lock_err)?;
        if guard.iter().any(|c| c.slug() == category.slug()) {
            return Err(StorageError::Conflict);
        }
        guard.push(category.clone());
        Ok(())
    }

    async fn insert_section(&self, section: &Section) -> Result<(), StorageError> {
        let mut guard = self.sections.lock().map_err(lock_err)?;
        if guard
            .iter()
            .any(|s| s.topic_id() == section.topic_id() && s.slug() == section.slug())
        {
            return Err(StorageError::Conflict);
        }
        guard.push(section.clone());
        Ok(())
    }

    async fn find_topic_by_slug(&self, slug: &Slug) -> Result<Option<Topic>, StorageError> {
        let guard = self.topics.lock().map_err(lock_err)?;
        Ok(guard.iter().find(|t| t.slug() == slug).cloned())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let guard = self.topics.lock().map_err(lock_err)?;
        let mut topics = guard.clone();
        topics.sort_by_key(Topic::order);
        Ok(topics)
    }

    async fn find_category_by_slug(
        &self,
        topic_id: &TopicId,
        slug: &Slug,
    ) -> Result<Option<Category>, StorageError> {
        let guard = self.categories.lock().map_err(lock_err)?;
        Ok(guard
            .iter()
            .find(|c| c.topic_id() == topic_id && c.slug() == slug)
            .cloned())
    }

    async fn list_categories_for_topic(
        &self,
        topic_id: &TopicId,
    ) -> Result<Vec<Category>, StorageError> {
        let guard = self.categories.lock().map_err(lock_err)?;
        let mut categories: Vec<Category> = guard
            .iter()
            .filter(|c| c.topic_id() == topic_id)
            .cloned()
            .collect();
        categories.sort_by_key(Category::order);
        Ok(categories)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let guard = self.categories.lock().map_err(lock_err)?;
        let mut categories = guard.clone();
        categories.sort_by_key(Category::order);
        Ok(categories)
    }

    async fn find_section_by_slug(&self, slug: &Slug) -> Result<Option<Section>, StorageError> {
        let guard = self.sections.lock().map_err(lock_err)?;
        Ok(guard.iter().find(|s| s.slug() == slug).cloned())
    }

    async fn find_section_in_topic(
        &self,
        topic_id: &TopicId,
        slug: &Slug,
    ) -> Result<Option<Section>, StorageError> {
        let guard = self.sections.lock().map_err(lock_err)?;
        Ok(guard
            .iter()
            .find(|s| s.topic_id() == topic_id && s.slug() == slug)
            .cloned())
    }

    async fn list_sections_for_topic(
        &self,
        topic_id: &TopicId,
    ) -> Result<Vec<Section>, StorageError> {
        let guard = self.sections.lock().map_err(lock_err)?;
        let mut sections: Vec<Section> = guard
            .iter()
            .filter(|s| s.topic_id() == topic_id)
            .cloned()
            .collect();
        sections.sort_by_key(Section::order);
        Ok(sections)
    }

    async fn list_sections_for_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Section>, StorageError> {
        let guard = self.sections.lock().map_err(lock_err)?;
        let mut sections: Vec<Section> = guard
            .iter()
            .filter(|s| s.category_id() == Some(category_id))
            .cloned()
            .collect();
        sections.sort_by_key(Section::order);
        Ok(sections)
    }

    async fn list_sections(&self) -> Result<Vec<Section>, StorageError> {
        let guard = self.sections.lock().map_err(lock_err)?;
        let mut sections = guard.clone();
        sections.sort_by_key(Section::order);
        Ok(sections)
    }

    async fn get_sections_by_ids(&self, ids: &[SectionId]) -> Result<Vec<Section>, StorageError> {
        let guard = self.sections.lock().map_err(lock_err)?;
        Ok(guard
            .iter()
            .filter(|s| ids.contains(s.id()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn find(
        &self,
        user_key: &str,
        section_id: &SectionId,
    ) -> Result<Option<CompletionRecord>, StorageError> {
        let guard = self.completions.lock().map_err(lock_err)?;
        Ok(guard
            .get(&(user_key.to_owned(), section_id.clone()))
            .cloned())
    }

    async fn list_for_user(&self, user_key: &str) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self.completions.lock().map_err(lock_err)?;
        Ok(guard
            .values()
            .filter(|r| r.user_key() == user_key)
            .cloned()
            .collect())
    }

    async fn list_for_sections(
        &self,
        user_key: &str,
        section_ids: &[SectionId],
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self.completions.lock().map_err(lock_err)?;
        Ok(guard
            .values()
            .filter(|r| r.user_key() == user_key && section_ids.contains(r.section_id()))
            .cloned()
            .collect())
    }

    async fn upsert(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let mut guard = self.completions.lock().map_err(lock_err)?;
        guard.insert(
            (record.user_key().to_owned(), record.section_id().clone()),
            record.clone(),
        );
        Ok(())
    }
}

/// Aggregates content and completion repositories behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub completions: Arc<dyn CompletionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let content: Arc<dyn ContentRepository> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionRepository> = Arc::new(repo);
        Self {
            content,
            completions,
        }
    }
}
