use thiserror::Error;

use crate::model::{CategoryError, CompletionError, SectionError, SlugError, TopicError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}
