//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use trailhead_core::model::SlugError;

/// Which level of the content tree a lookup failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Topic,
    Category,
    Section,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Topic => "topic",
            EntityKind::Category => "category",
            EntityKind::Section => "section",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors emitted by `ProgressService` and `CurriculumService`.
///
/// Every variant maps onto one of three stable machine-checkable kinds via
/// [`kind`](ProgressError::kind): `not_found`, `validation`, or `storage`.
/// The Display of the storage variant is a fixed string so internal detail
/// never reaches a caller; the real cause stays in `source()`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("{kind} not found: {slug}")]
    NotFound { kind: EntityKind, slug: String },

    #[error("no active session found")]
    SessionNotFound,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),

    #[error("storage unavailable")]
    Storage(#[from] StorageError),
}

impl ProgressError {
    /// Stable error kind for wire responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressError::NotFound { .. } | ProgressError::SessionNotFound => "not_found",
            ProgressError::MissingField(_) | ProgressError::InvalidSlug(_) => "validation",
            ProgressError::Storage(_) => "storage",
        }
    }

    pub(crate) fn not_found(kind: EntityKind, slug: impl Into<String>) -> Self {
        ProgressError::NotFound {
            kind,
            slug: slug.into(),
        }
    }
}

/// Errors emitted by `RecommendationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecommendError {
    #[error("storage unavailable")]
    Storage(#[from] StorageError),
}

impl RecommendError {
    /// Stable error kind for wire responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendError::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let not_found = ProgressError::not_found(EntityKind::Topic, "javascript");
        assert_eq!(not_found.kind(), "not_found");
        assert_eq!(not_found.to_string(), "topic not found: javascript");

        assert_eq!(ProgressError::MissingField("sectionSlug").kind(), "validation");
        assert_eq!(ProgressError::SessionNotFound.kind(), "not_found");
    }

    #[test]
    fn storage_display_leaks_no_detail() {
        let err = ProgressError::Storage(StorageError::Connection(
            "sqlite:///var/data/trailhead.db timed out".into(),
        ));
        assert_eq!(err.kind(), "storage");
        assert_eq!(err.to_string(), "storage unavailable");

        let err = RecommendError::Storage(StorageError::Connection("pool exhausted".into()));
        assert_eq!(err.to_string(), "storage unavailable");
    }
}
