mod category;
mod completion;
mod identity;
mod ids;
mod section;
mod slug;
mod topic;

pub use category::{Category, CategoryError, DEFAULT_CATEGORY_GROUP};
pub use completion::{CompletionError, CompletionRecord};
pub use identity::Identity;
pub use ids::{CategoryId, SectionId, TopicId};
pub use section::{Difficulty, Section, SectionError};
pub use slug::{MAX_SLUG_LEN, Slug, SlugError};
pub use topic::{DEFAULT_TOPIC_ICON, Topic, TopicError};
