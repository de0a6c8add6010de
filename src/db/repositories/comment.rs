//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Comment, CommentStatus};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment, returning it with its assigned id
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// All comments on a post, oldest first
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Comments on a post with a given status, oldest first
    async fn list_for_post_with_status(
        &self,
        post_id: i64,
        status: CommentStatus,
    ) -> Result<Vec<Comment>>;

    /// All comments, newest first (moderation queue)
    async fn list(&self) -> Result<Vec<Comment>>;

    /// Set the moderation status
    async fn set_status(&self, id: i64, status: CommentStatus) -> Result<()>;

    /// Delete a comment. Returns false when the row was already gone.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: SqlitePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

const COMMENT_COLUMNS: &str = "id, text, user_id, post_id, status, created_at, updated_at";

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (text, user_id, post_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.text)
        .bind(comment.user_id)
        .bind(comment.post_id)
        .bind(comment.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        let mut created = comment.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get comment by ID")?;

        row.map(|r| row_to_comment(&r)).transpose()
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? ORDER BY id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments for post")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn list_for_post_with_status(
        &self,
        post_id: i64,
        status: CommentStatus,
    ) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = ? AND status = ? ORDER BY id ASC"
        ))
        .bind(post_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments for post by status")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn list(&self) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn set_status(&self, id: i64, status: CommentStatus) -> Result<()> {
        sqlx::query("UPDATE comments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set comment status")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    let status: String = row.get("status");
    Ok(Comment {
        id: row.get("id"),
        text: row.get("text"),
        user_id: row.get("user_id"),
        post_id: row.get("post_id"),
        status: CommentStatus::from_str(&status)
            .ok_or_else(|| anyhow::anyhow!("Invalid comment status: {}", status))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
