//! Post repository
//!
//! Database operations for posts, including the `post_tags` join table,
//! id-adjacent navigation, and the home page selections (popular, featured,
//! recent).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{ListParams, PagedResult, Post, PostStatus};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post, returning it with its assigned id
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List posts, newest id first, paginated
    async fn list(&self, params: &ListParams) -> Result<PagedResult<Post>>;

    /// List posts in a category, paginated
    async fn list_by_category(
        &self,
        category_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Post>>;

    /// List posts carrying a tag, paginated
    async fn list_by_tag(&self, tag_id: i64, params: &ListParams) -> Result<PagedResult<Post>>;

    /// Rewrite the mutable columns of an existing post
    async fn update(&self, post: &Post) -> Result<()>;

    /// Delete a post row. Returns false when the row was already gone.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check whether a slug is already taken
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Set the publication status
    async fn set_status(&self, id: i64, status: PostStatus) -> Result<()>;

    /// Set the featured flag
    async fn set_featured(&self, id: i64, featured: bool) -> Result<()>;

    /// Set the category
    async fn set_category(&self, id: i64, category_id: i64) -> Result<()>;

    /// Record (or clear) the stored image filename
    async fn set_image(&self, id: i64, image: Option<&str>) -> Result<()>;

    /// Replace the post's tag link set with exactly `tag_ids`
    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// IDs of the tags linked to a post
    async fn tag_ids(&self, post_id: i64) -> Result<Vec<i64>>;

    /// The post with the greatest id strictly less than `id`
    async fn previous(&self, id: i64) -> Result<Option<Post>>;

    /// The post with the smallest id strictly greater than `id`
    async fn next(&self, id: i64) -> Result<Option<Post>>;

    /// Top posts by view count, descending
    async fn popular(&self, limit: i64) -> Result<Vec<Post>>;

    /// Posts flagged as featured
    async fn featured(&self, limit: i64) -> Result<Vec<Post>>;

    /// Latest posts by display date, descending
    async fn recent(&self, limit: i64) -> Result<Vec<Post>>;

    /// Bump the view counter
    async fn increment_views(&self, id: i64) -> Result<()>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const POST_COLUMNS: &str = "id, title, slug, content, description, category_id, user_id, \
     status, views, is_featured, date, image, created_at, updated_at";

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, slug, content, description, category_id, user_id,
                               status, views, is_featured, date, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.description)
        .bind(post.category_id)
        .bind(post.user_id)
        .bind(post.status.as_str())
        .bind(post.views)
        .bind(post.is_featured)
        .bind(post.date)
        .bind(&post.image)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        let mut created = post.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by ID")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by slug")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<Post>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?;

        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY id DESC LIMIT ? OFFSET ?"
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts")?;

        let items = rows.iter().map(row_to_post).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn list_by_category(
        &self,
        category_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Post>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by category")?;

        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE category_id = ? \
             ORDER BY id DESC LIMIT ? OFFSET ?"
        ))
        .bind(category_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts by category")?;

        let items = rows.iter().map(row_to_post).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn list_by_tag(&self, tag_id: i64, params: &ListParams) -> Result<PagedResult<Post>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM post_tags WHERE tag_id = ?")
                .bind(tag_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count posts by tag")?;

        let rows = sqlx::query(&format!(
            "SELECT p.id, p.title, p.slug, p.content, p.description, p.category_id, \
                    p.user_id, p.status, p.views, p.is_featured, p.date, p.image, \
                    p.created_at, p.updated_at \
             FROM posts p \
             INNER JOIN post_tags pt ON pt.post_id = p.id \
             WHERE pt.tag_id = ? \
             ORDER BY p.id DESC LIMIT ? OFFSET ?"
        ))
        .bind(tag_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts by tag")?;

        let items = rows.iter().map(row_to_post).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn update(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, slug = ?, content = ?, description = ?, category_id = ?,
                status = ?, is_featured = ?, date = ?, image = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.description)
        .bind(post.category_id)
        .bind(post.status.as_str())
        .bind(post.is_featured)
        .bind(post.date)
        .bind(&post.image)
        .bind(Utc::now())
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check post slug")?;
        Ok(count > 0)
    }

    async fn set_status(&self, id: i64, status: PostStatus) -> Result<()> {
        sqlx::query("UPDATE posts SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set post status")?;
        Ok(())
    }

    async fn set_featured(&self, id: i64, featured: bool) -> Result<()> {
        sqlx::query("UPDATE posts SET is_featured = ?, updated_at = ? WHERE id = ?")
            .bind(featured)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set post featured flag")?;
        Ok(())
    }

    async fn set_category(&self, id: i64, category_id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET category_id = ?, updated_at = ? WHERE id = ?")
            .bind(category_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set post category")?;
        Ok(())
    }

    async fn set_image(&self, id: i64, image: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE posts SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set post image")?;
        Ok(())
    }

    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        // Replace the full link set: links absent from `tag_ids` are removed,
        // missing links are added.
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .context("Failed to clear post tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&self.pool)
                .await
                .context("Failed to link tag to post")?;
        }

        Ok(())
    }

    async fn tag_ids(&self, post_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query_scalar(
            "SELECT tag_id FROM post_tags WHERE post_id = ? ORDER BY tag_id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get post tag ids")?;
        Ok(rows)
    }

    async fn previous(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id < ? ORDER BY id DESC LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get previous post")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn next(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id > ? ORDER BY id ASC LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get next post")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn popular(&self, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY views DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get popular posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn featured(&self, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE is_featured = 1 ORDER BY id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get featured posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY date DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get recent posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment post views")?;
        Ok(())
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status: String = row.get("status");
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        description: row.get("description"),
        category_id: row.get("category_id"),
        user_id: row.get("user_id"),
        status: PostStatus::from_str(&status)
            .ok_or_else(|| anyhow::anyhow!("Invalid post status: {}", status))?,
        views: row.get("views"),
        is_featured: row.get("is_featured"),
        date: row.get("date"),
        image: row.get("image"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
