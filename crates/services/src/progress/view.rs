//! Request and response shapes for the progress endpoints.
//!
//! Response DTOs serialize in camelCase so the wire contract matches what
//! clients already consume. Progress maps use `BTreeMap` so serialization
//! order is deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of the toggle-completion request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSectionRequest {
    /// Accepted for route symmetry; resolution is by section slug alone.
    #[serde(default)]
    pub topic_slug: Option<String>,
    #[serde(default)]
    pub section_slug: Option<String>,
    pub completed: bool,
}

/// Body of the add-study-minutes request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTimeRequest {
    #[serde(default)]
    pub section_slug: Option<String>,
    pub minutes: u32,
}

/// Body of the end-study-session request. `duration` is in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    #[serde(default)]
    pub section_slug: Option<String>,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgressView {
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgressView {
    pub progress: BTreeMap<String, bool>,
}

/// Numeric roll-up for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    pub total_sections: usize,
    pub completed_sections: usize,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgressView {
    pub progress: BTreeMap<String, bool>,
    pub stats: TopicStats,
}

/// One row of the all-topics dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgressSummary {
    pub topic_slug: String,
    pub topic_name: String,
    pub icon: String,
    pub total_sections: usize,
    pub completed_sections: usize,
    pub percentage: u8,
    pub continue_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTopicsProgress {
    pub topics: Vec<TopicProgressSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpentView {
    pub time_spent_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionView {
    pub session_start: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClosedView {
    pub total_time_spent: u32,
    pub session_duration: u32,
}
