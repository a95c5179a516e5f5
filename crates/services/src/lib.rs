#![forbid(unsafe_code)]

pub mod curriculum;
pub mod error;
pub mod next_step;
pub mod progress;
pub mod recommend;

pub use trailhead_core::Clock;

pub use error::{EntityKind, ProgressError, RecommendError};

pub use curriculum::{
    CategoryAggregateView, CategorySummary, CurriculumService, SectionAggregateView,
    SectionSummary, TopicAggregateView, TopicSummary,
};
pub use next_step::resolve_next_step;
pub use progress::{
    AllTopicsProgress, CategoryProgressView, CompletionSet, EndSessionRequest, ProgressService,
    RecordTimeRequest, SectionProgressView, SessionClosedView, StudySessionView,
    TimeSpentView, ToggleOutcome, ToggleSectionRequest, TopicProgressSummary, TopicProgressView,
    TopicStats,
};
pub use recommend::{Recommendation, RecommendationService};
