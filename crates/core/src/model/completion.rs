use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::SectionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("user key cannot be empty")]
    EmptyUserKey,
}

/// Per-user, per-section completion state plus study-time metadata.
///
/// Exactly one record exists per (user key, section) pair; the storage layer
/// enforces that with a compound-key upsert. Records are created lazily on
/// first interaction and never deleted. The user key is an opaque partition
/// key (an authenticated id, a session id, or the anonymous sentinel) and
/// the record does not care which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    user_key: String,
    section_id: SectionId,
    completed: bool,
    last_accessed: DateTime<Utc>,
    time_spent_minutes: u32,
    session_start: Option<DateTime<Utc>>,
}

impl CompletionRecord {
    /// Creates a fresh record for a first interaction.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::EmptyUserKey` if the user key is empty or
    /// whitespace-only.
    pub fn new(
        user_key: impl Into<String>,
        section_id: SectionId,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, CompletionError> {
        let user_key = user_key.into();
        if user_key.trim().is_empty() {
            return Err(CompletionError::EmptyUserKey);
        }

        Ok(Self {
            user_key,
            section_id,
            completed,
            last_accessed: now,
            time_spent_minutes: 0,
            session_start: None,
        })
    }

    /// Rebuilds a record from its persisted fields, bypassing transitions.
    #[must_use]
    pub fn from_persisted(
        user_key: String,
        section_id: SectionId,
        completed: bool,
        last_accessed: DateTime<Utc>,
        time_spent_minutes: u32,
        session_start: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_key,
            section_id,
            completed,
            last_accessed,
            time_spent_minutes,
            session_start,
        }
    }

    /// Sets the completion flag and touches `last_accessed`.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.last_accessed = now;
    }

    /// Adds study minutes (saturating) and touches `last_accessed`.
    pub fn add_time(&mut self, minutes: u32, now: DateTime<Utc>) {
        self.time_spent_minutes = self.time_spent_minutes.saturating_add(minutes);
        self.last_accessed = now;
    }

    /// Opens a study session, replacing any session already open.
    pub fn begin_session(&mut self, now: DateTime<Utc>) {
        self.session_start = Some(now);
        self.last_accessed = now;
    }

    /// Closes the session, crediting the elapsed duration rounded up to
    /// whole minutes. Returns the minutes added.
    pub fn close_session(&mut self, duration_secs: u32, now: DateTime<Utc>) -> u32 {
        let minutes = duration_secs.div_ceil(60);
        self.time_spent_minutes = self.time_spent_minutes.saturating_add(minutes);
        self.session_start = None;
        self.last_accessed = now;
        minutes
    }

    // Accessors
    #[must_use]
    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    #[must_use]
    pub fn section_id(&self) -> &SectionId {
        &self.section_id
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    #[must_use]
    pub fn time_spent_minutes(&self) -> u32 {
        self.time_spent_minutes
    }

    #[must_use]
    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.session_start
    }
}
