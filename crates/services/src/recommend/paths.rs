//! Static learning-path configuration the recommendation engine consumes.
//!
//! This is build-time data maintained by content owners, not something the
//! engine derives. Topics absent from the table fall back to
//! [`LearningPath::DEFAULT`].

/// Difficulty tier and prerequisite list for one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningPath {
    pub difficulty: u8,
    pub prereqs: &'static [&'static str],
}

impl LearningPath {
    /// Fallback for topics not in the table.
    pub const DEFAULT: LearningPath = LearningPath {
        difficulty: 2,
        prereqs: &[],
    };
}

/// Looks up a topic's learning path, falling back to the default.
#[must_use]
pub fn learning_path(topic_slug: &str) -> LearningPath {
    match topic_slug {
        "javascript" => LearningPath {
            difficulty: 1,
            prereqs: &[],
        },
        "mongodb" => LearningPath {
            difficulty: 2,
            prereqs: &["javascript"],
        },
        "express" => LearningPath {
            difficulty: 2,
            prereqs: &["mongodb", "javascript"],
        },
        "react" => LearningPath {
            difficulty: 2,
            prereqs: &["javascript"],
        },
        "node" => LearningPath {
            difficulty: 2,
            prereqs: &["javascript"],
        },
        "dsa" => LearningPath {
            difficulty: 3,
            prereqs: &["javascript"],
        },
        "os" => LearningPath {
            difficulty: 2,
            prereqs: &[],
        },
        "networking" => LearningPath {
            difficulty: 2,
            prereqs: &[],
        },
        "system-design" => LearningPath {
            difficulty: 4,
            prereqs: &["mongodb", "express", "react", "node"],
        },
        _ => LearningPath::DEFAULT,
    }
}

/// Topics called out as in-demand in recommendation reasons.
pub const TRENDING_SKILLS: &[&str] = &["react", "mongodb"];

/// The interview-prep topic, called out separately in reasons.
pub const INTERVIEW_TOPIC: &str = "dsa";
