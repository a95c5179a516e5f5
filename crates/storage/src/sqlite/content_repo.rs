use trailhead_core::model::{Category, CategoryId, Section, SectionId, Slug, Topic, TopicId};

use super::SqliteRepository;
use super::mapping::{map_category_row, map_section_row, map_topic_row};
use crate::repository::{ContentRepository, StorageError};

const SECTION_COLUMNS: &str = "id, topic_id, category_id, slug, title, ord, difficulty";

fn conn_err(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        other => StorageError::Connection(other.to_string()),
    }
}

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn insert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO topics (id, slug, name, description, icon, ord)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(topic.id().as_str())
        .bind(topic.slug().as_str())
        .bind(topic.name())
        .bind(topic.description())
        .bind(topic.icon())
        .bind(i64::from(topic.order()))
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        Ok(())
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO categories (id, topic_id, slug, name, ord, grp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(category.id().as_str())
        .bind(category.topic_id().as_str())
        .bind(category.slug().as_str())
        .bind(category.name())
        .bind(i64::from(category.order()))
        .bind(category.group())
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        Ok(())
    }

    async fn insert_section(&self, section: &Section) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sections (id, topic_id, category_id, slug, title, ord, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(section.id().as_str())
        .bind(section.topic_id().as_str())
        .bind(section.category_id().map(CategoryId::as_str))
        .bind(section.slug().as_str())
        .bind(section.title())
        .bind(i64::from(section.order()))
        .bind(section.difficulty().as_str())
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        Ok(())
    }

    async fn find_topic_by_slug(&self, slug: &Slug) -> Result<Option<Topic>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, slug, name, description, icon, ord
            FROM topics WHERE slug = ?1
            ",
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_topic_row).transpose()
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, slug, name, description, icon, ord
            FROM topics
            ORDER BY ord ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(map_topic_row(&row)?);
        }
        Ok(topics)
    }

    async fn find_category_by_slug(
        &self,
        topic_id: &TopicId,
        slug: &Slug,
    ) -> Result<Option<Category>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, topic_id, slug, name, ord, grp
            FROM categories
            WHERE topic_id = ?1 AND slug = ?2
            ",
        )
        .bind(topic_id.as_str())
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_category_row).transpose()
    }

    async fn list_categories_for_topic(
        &self,
        topic_id: &TopicId,
    ) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, topic_id, slug, name, ord, grp
            FROM categories
            WHERE topic_id = ?1
            ORDER BY ord ASC
            ",
        )
        .bind(topic_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in rows {
            categories.push(map_category_row(&row)?);
        }
        Ok(categories)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, topic_id, slug, name, ord, grp
            FROM categories
            ORDER BY ord ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in rows {
            categories.push(map_category_row(&row)?);
        }
        Ok(categories)
    }

    async fn find_section_by_slug(&self, slug: &Slug) -> Result<Option<Section>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE slug = ?1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_section_row).transpose()
    }

    async fn find_section_in_topic(
        &self,
        topic_id: &TopicId,
        slug: &Slug,
    ) -> Result<Option<Section>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE topic_id = ?1 AND slug = ?2"
        ))
        .bind(topic_id.as_str())
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_section_row).transpose()
    }

    async fn list_sections_for_topic(
        &self,
        topic_id: &TopicId,
    ) -> Result<Vec<Section>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE topic_id = ?1 ORDER BY ord ASC"
        ))
        .bind(topic_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            sections.push(map_section_row(&row)?);
        }
        Ok(sections)
    }

    async fn list_sections_for_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Section>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE category_id = ?1 ORDER BY ord ASC"
        ))
        .bind(category_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            sections.push(map_section_row(&row)?);
        }
        Ok(sections)
    }

    async fn list_sections(&self) -> Result<Vec<Section>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections ORDER BY ord ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            sections.push(map_section_row(&row)?);
        }
        Ok(sections)
    }

    async fn get_sections_by_ids(&self, ids: &[SectionId]) -> Result<Vec<Section>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id IN (");
        for i in 0..ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push(')');

        let mut q = sqlx::query(&sql);
        for id in ids {
            q = q.bind(id.as_str());
        }

        let rows = q.fetch_all(&self.pool).await.map_err(conn_err)?;

        // Present rows only; missing ids are the caller's signal that a
        // completion record dangles.
        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            sections.push(map_section_row(&row)?);
        }
        Ok(sections)
    }
}
