//! Category repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category, returning it with its assigned id
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories ordered by title
    async fn list(&self) -> Result<Vec<Category>>;

    /// Rename a category
    async fn update(&self, category: &Category) -> Result<()>;

    /// Delete a category. Returns false when the row was already gone.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check whether a slug is already taken
    async fn slug_exists(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO categories (title, slug, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&category.title)
        .bind(&category.slug)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create category")?;

        let mut created = category.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, title, slug, created_at FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by ID")?;

        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row =
            sqlx::query("SELECT id, title, slug, created_at FROM categories WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to get category by slug")?;

        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows =
            sqlx::query("SELECT id, title, slug, created_at FROM categories ORDER BY title ASC")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn update(&self, category: &Category) -> Result<()> {
        sqlx::query("UPDATE categories SET title = ?, slug = ?, updated_at = ? WHERE id = ?")
            .bind(&category.title)
            .bind(&category.slug)
            .bind(Utc::now())
            .bind(category.id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected() > 0)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check category slug")?;
        Ok(count > 0)
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}
