use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{CategoryId, SectionId, TopicId};
use crate::model::slug::Slug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SectionError {
    #[error("section title cannot be empty")]
    EmptyTitle,

    #[error("section order must be >= 1")]
    InvalidOrder,
}

/// Editorial difficulty tier of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Storage encoding of the tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

/// Smallest completable content unit.
///
/// Sections always belong to a Topic; the Category link is optional and may
/// even dangle (the referenced category no longer exists). Aggregation
/// tolerates both rather than failing a whole view over one bad pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    topic_id: TopicId,
    category_id: Option<CategoryId>,
    slug: Slug,
    title: String,
    order: u32,
    difficulty: Difficulty,
}

impl Section {
    /// Creates a new Section.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::EmptyTitle` if the title is empty or
    /// whitespace-only, `SectionError::InvalidOrder` if `order` is zero.
    pub fn new(
        id: SectionId,
        topic_id: TopicId,
        category_id: Option<CategoryId>,
        slug: Slug,
        title: impl Into<String>,
        order: u32,
        difficulty: Difficulty,
    ) -> Result<Self, SectionError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SectionError::EmptyTitle);
        }
        if order == 0 {
            return Err(SectionError::InvalidOrder);
        }

        Ok(Self {
            id,
            topic_id,
            category_id,
            slug,
            title: title.trim().to_owned(),
            order,
            difficulty,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category_id.as_ref()
    }

    #[must_use]
    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_title() {
        let err = Section::new(
            SectionId::new("s-1"),
            TopicId::new("t-1"),
            None,
            Slug::parse("variables").unwrap(),
            "  ",
            1,
            Difficulty::Beginner,
        )
        .unwrap_err();
        assert_eq!(err, SectionError::EmptyTitle);
    }

    #[test]
    fn section_may_have_no_category() {
        let section = Section::new(
            SectionId::new("s-1"),
            TopicId::new("t-1"),
            None,
            Slug::parse("variables").unwrap(),
            "Variables",
            1,
            Difficulty::default(),
        )
        .unwrap();
        assert_eq!(section.category_id(), None);
        assert_eq!(section.difficulty(), Difficulty::Beginner);
    }

    #[test]
    fn difficulty_storage_encoding_is_lowercase() {
        assert_eq!(Difficulty::Beginner.as_str(), "beginner");
        assert_eq!(Difficulty::Intermediate.as_str(), "intermediate");
        assert_eq!(Difficulty::Advanced.as_str(), "advanced");
    }

    #[test]
    fn difficulty_parse_inverts_as_str() {
        assert_eq!(Difficulty::parse("advanced"), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::parse("expert"), None);
    }
}
