//! Recommendation engine: static learning paths plus the ranking service.

pub mod paths;
pub mod service;

pub use paths::{INTERVIEW_TOPIC, LearningPath, TRENDING_SKILLS, learning_path};
pub use service::{Recommendation, RecommendationService};
