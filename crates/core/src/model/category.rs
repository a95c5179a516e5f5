use thiserror::Error;

use crate::model::ids::{CategoryId, TopicId};
use crate::model::slug::Slug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category name cannot be empty")]
    EmptyName,

    #[error("category order must be >= 1")]
    InvalidOrder,
}

/// Group tag applied when a category is created without one. Groups drive
/// UI tab layout only and never participate in aggregation.
pub const DEFAULT_CATEGORY_GROUP: &str = "general";

/// A chapter within a Topic.
///
/// Categories are the roll-up unit for topic progress: a category counts as
/// completed only when every one of its sections is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    topic_id: TopicId,
    slug: Slug,
    name: String,
    order: u32,
    group: String,
}

impl Category {
    /// Creates a new Category.
    ///
    /// A blank group falls back to [`DEFAULT_CATEGORY_GROUP`].
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` if the name is empty or
    /// whitespace-only, `CategoryError::InvalidOrder` if `order` is zero.
    pub fn new(
        id: CategoryId,
        topic_id: TopicId,
        slug: Slug,
        name: impl Into<String>,
        order: u32,
        group: impl Into<String>,
    ) -> Result<Self, CategoryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if order == 0 {
            return Err(CategoryError::InvalidOrder);
        }

        let group = group.into();
        let group = if group.trim().is_empty() {
            DEFAULT_CATEGORY_GROUP.to_owned()
        } else {
            group.trim().to_owned()
        };

        Ok(Self {
            id,
            topic_id,
            slug,
            name: name.trim().to_owned(),
            order,
            group,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_name() {
        let err = Category::new(
            CategoryId::new("c-1"),
            TopicId::new("t-1"),
            Slug::parse("basics").unwrap(),
            "",
            1,
            "fundamentals",
        )
        .unwrap_err();
        assert_eq!(err, CategoryError::EmptyName);
    }

    #[test]
    fn blank_group_falls_back_to_general() {
        let category = Category::new(
            CategoryId::new("c-1"),
            TopicId::new("t-1"),
            Slug::parse("basics").unwrap(),
            "Basics",
            1,
            "   ",
        )
        .unwrap();
        assert_eq!(category.group(), DEFAULT_CATEGORY_GROUP);
    }

    #[test]
    fn new_rejects_zero_order() {
        let err = Category::new(
            CategoryId::new("c-1"),
            TopicId::new("t-1"),
            Slug::parse("basics").unwrap(),
            "Basics",
            0,
            "",
        )
        .unwrap_err();
        assert_eq!(err, CategoryError::InvalidOrder);
    }
}
