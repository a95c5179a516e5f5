use thiserror::Error;

use crate::model::ids::TopicId;
use crate::model::slug::Slug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,

    #[error("topic order must be >= 1")]
    InvalidOrder,
}

/// Default icon applied when a topic is created without one.
pub const DEFAULT_TOPIC_ICON: &str = "📚";

/// Top-level curriculum subject ("JavaScript", "System Design", ...).
///
/// Root of a content tree; categories and sections point back at it.
/// Content entities are read-only to the aggregation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    slug: Slug,
    name: String,
    description: String,
    icon: String,
    order: u32,
}

impl Topic {
    /// Creates a new Topic.
    ///
    /// A blank icon falls back to [`DEFAULT_TOPIC_ICON`].
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyName` if the name is empty or
    /// whitespace-only, `TopicError::InvalidOrder` if `order` is zero.
    pub fn new(
        id: TopicId,
        slug: Slug,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        order: u32,
    ) -> Result<Self, TopicError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TopicError::EmptyName);
        }
        if order == 0 {
            return Err(TopicError::InvalidOrder);
        }

        let icon = icon.into();
        let icon = if icon.trim().is_empty() {
            DEFAULT_TOPIC_ICON.to_owned()
        } else {
            icon.trim().to_owned()
        };

        Ok(Self {
            id,
            slug,
            name: name.trim().to_owned(),
            description: description.into().trim().to_owned(),
            icon,
            order,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
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
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }
}
