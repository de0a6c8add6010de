//! Tag repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Tag;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a new tag, returning it with its assigned id
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// List all tags ordered by title
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Tags linked to a post
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Tag>>;

    /// Rename a tag
    async fn update(&self, tag: &Tag) -> Result<()>;

    /// Delete a tag. Returns false when the row was already gone.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check whether a slug is already taken
    async fn slug_exists(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO tags (title, slug, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&tag.title)
        .bind(&tag.slug)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create tag")?;

        let mut created = tag.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, title, slug, created_at FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        Ok(row.map(|r| row_to_tag(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, title, slug, created_at FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by slug")?;

        Ok(row.map(|r| row_to_tag(&r)))
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, title, slug, created_at FROM tags ORDER BY title ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.title, t.slug, t.created_at \
             FROM tags t \
             INNER JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = ? \
             ORDER BY t.title ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tags for post")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn update(&self, tag: &Tag) -> Result<()> {
        sqlx::query("UPDATE tags SET title = ?, slug = ?, updated_at = ? WHERE id = ?")
            .bind(&tag.title)
            .bind(&tag.slug)
            .bind(Utc::now())
            .bind(tag.id)
            .execute(&self.pool)
            .await
            .context("Failed to update tag")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;

        Ok(result.rows_affected() > 0)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check tag slug")?;
        Ok(count > 0)
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}
