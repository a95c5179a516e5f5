pub mod rollup;
pub mod service;
pub mod view;

pub use rollup::{CompletionSet, category_completed, category_completion_map, percentage};
pub use service::ProgressService;
pub use view::{
    AllTopicsProgress, CategoryProgressView, EndSessionRequest, RecordTimeRequest,
    SectionProgressView, SessionClosedView, StudySessionView, TimeSpentView, ToggleOutcome,
    ToggleSectionRequest, TopicProgressSummary, TopicProgressView, TopicStats,
};
