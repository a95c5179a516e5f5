use sqlx::Row;
use trailhead_core::model::{
    Category, CategoryId, CompletionRecord, Difficulty, Section, SectionId, Slug, Topic, TopicId,
};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn ord_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn slug_from_row(row: &sqlx::sqlite::SqliteRow, column: &'static str) -> Result<Slug, StorageError> {
    let raw: String = row.try_get(column).map_err(ser)?;
    Slug::parse(raw).map_err(ser)
}

pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    Difficulty::parse(s)
        .ok_or_else(|| StorageError::Serialization(format!("invalid difficulty: {s}")))
}

pub(crate) fn map_topic_row(row: &sqlx::sqlite::SqliteRow) -> Result<Topic, StorageError> {
    Topic::new(
        TopicId::new(row.try_get::<String, _>("id").map_err(ser)?),
        slug_from_row(row, "slug")?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        row.try_get::<String, _>("icon").map_err(ser)?,
        ord_from_i64("ord", row.try_get::<i64, _>("ord").map_err(ser)?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_category_row(row: &sqlx::sqlite::SqliteRow) -> Result<Category, StorageError> {
    Category::new(
        CategoryId::new(row.try_get::<String, _>("id").map_err(ser)?),
        TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?),
        slug_from_row(row, "slug")?,
        row.try_get::<String, _>("name").map_err(ser)?,
        ord_from_i64("ord", row.try_get::<i64, _>("ord").map_err(ser)?)?,
        row.try_get::<String, _>("grp").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_section_row(row: &sqlx::sqlite::SqliteRow) -> Result<Section, StorageError> {
    let difficulty_str: String = row.try_get("difficulty").map_err(ser)?;

    Section::new(
        SectionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?),
        row.try_get::<Option<String>, _>("category_id")
            .map_err(ser)?
            .map(CategoryId::new),
        slug_from_row(row, "slug")?,
        row.try_get::<String, _>("title").map_err(ser)?,
        ord_from_i64("ord", row.try_get::<i64, _>("ord").map_err(ser)?)?,
        parse_difficulty(difficulty_str.as_str())?,
    )
    .map_err(ser)
}

pub(crate) fn map_completion_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CompletionRecord, StorageError> {
    let minutes_i64: i64 = row.try_get("time_spent_minutes").map_err(ser)?;
    let minutes = u32::try_from(minutes_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid time_spent_minutes: {minutes_i64}"))
    })?;

    Ok(CompletionRecord::from_persisted(
        row.try_get::<String, _>("user_key").map_err(ser)?,
        SectionId::new(row.try_get::<String, _>("section_id").map_err(ser)?),
        row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        row.try_get("last_accessed").map_err(ser)?,
        minutes,
        row.try_get("session_start").map_err(ser)?,
    ))
}
