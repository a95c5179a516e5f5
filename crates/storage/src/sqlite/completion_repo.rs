use trailhead_core::model::{CompletionRecord, SectionId};

use super::SqliteRepository;
use super::mapping::map_completion_row;
use crate::repository::{CompletionRepository, StorageError};

const COMPLETION_COLUMNS: &str =
    "user_key, section_id, completed, last_accessed, time_spent_minutes, session_start";

fn conn_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn find(
        &self,
        user_key: &str,
        section_id: &SectionId,
    ) -> Result<Option<CompletionRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions WHERE user_key = ?1 AND section_id = ?2"
        ))
        .bind(user_key)
        .bind(section_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_completion_row).transpose()
    }

    async fn list_for_user(&self, user_key: &str) -> Result<Vec<CompletionRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions WHERE user_key = ?1"
        ))
        .bind(user_key)
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_completion_row(&row)?);
        }
        Ok(records)
    }

    async fn list_for_sections(
        &self,
        user_key: &str,
        section_ids: &[SectionId],
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions WHERE user_key = ?1 AND section_id IN ("
        );
        for i in 0..section_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 2).to_string());
        }
        sql.push(')');

        let mut q = sqlx::query(&sql).bind(user_key);
        for id in section_ids {
            q = q.bind(id.as_str());
        }

        let rows = q.fetch_all(&self.pool).await.map_err(conn_err)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_completion_row(&row)?);
        }
        Ok(records)
    }

    async fn upsert(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO completions (
                user_key, section_id, completed, last_accessed,
                time_spent_minutes, session_start
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_key, section_id) DO UPDATE SET
                completed = excluded.completed,
                last_accessed = excluded.last_accessed,
                time_spent_minutes = excluded.time_spent_minutes,
                session_start = excluded.session_start
            ",
        )
        .bind(record.user_key())
        .bind(record.section_id().as_str())
        .bind(i64::from(record.completed()))
        .bind(record.last_accessed())
        .bind(i64::from(record.time_spent_minutes()))
        .bind(record.session_start())
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        Ok(())
    }
}
