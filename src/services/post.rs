//! Post service
//!
//! Business logic for the post lifecycle: creation with slug generation,
//! edits, publish/feature flags, tag association, id-adjacent navigation,
//! and the home page selections.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, PostStatus, UpdatePostInput};
use crate::services::slug::{generate_slug, unique_slug};

/// Author assigned when a post is created without an explicit one.
pub const DEFAULT_AUTHOR_ID: i64 = 1;

/// How many top-viewed posts the home page shows.
pub const POPULAR_LIMIT: i64 = 3;
/// How many featured posts the home page shows.
pub const FEATURED_LIMIT: i64 = 3;
/// How many recent posts the home page shows.
pub const RECENT_LIMIT: i64 = 4;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a post from the given input.
    ///
    /// The slug is derived from the title; a taken slug gets a numeric
    /// suffix. New posts start as drafts. When no author is given the
    /// post is attributed to the default author.
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.content.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }

        let date = Post::parse_display_date(&input.date).map_err(|_| {
            PostServiceError::ValidationError(format!(
                "Invalid date '{}', expected dd/mm/yy",
                input.date
            ))
        })?;

        let base = generate_slug(title);
        if base.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title yields an empty slug".to_string(),
            ));
        }

        let repo = &self.repo;
        let slug = unique_slug(&base, |candidate| async move {
            repo.slug_exists(&candidate).await
        })
        .await
        .context("Failed to find a free slug")?;

        let mut post = Post::new(
            title.to_string(),
            slug,
            input.content,
            input.description.unwrap_or_default(),
            input.author_id.unwrap_or(DEFAULT_AUTHOR_ID),
            date,
        );
        post.category_id = input.category_id;

        let created = self
            .repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        if let Some(tag_ids) = input.tag_ids {
            self.repo
                .sync_tags(created.id, &tag_ids)
                .await
                .context("Failed to attach tags")?;
        }

        Ok(created)
    }

    /// Update a post; absent input fields are left untouched.
    ///
    /// A title change regenerates the slug (deduplicated against all other
    /// posts). When `tag_ids` is present the tag link set is replaced.
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Post, PostServiceError> {
        let mut post = self.get(id).await?;

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            if title != post.title {
                let base = generate_slug(&title);
                if base.is_empty() {
                    return Err(PostServiceError::ValidationError(
                        "Title yields an empty slug".to_string(),
                    ));
                }
                let repo = &self.repo;
                let current = post.slug.clone();
                post.slug = unique_slug(&base, |candidate| {
                    let current = current.clone();
                    async move {
                        if candidate == current {
                            return Ok(false);
                        }
                        repo.slug_exists(&candidate).await
                    }
                })
                .await
                .context("Failed to find a free slug")?;
            }
            post.title = title;
        }

        if let Some(content) = input.content {
            post.content = content;
        }
        if let Some(description) = input.description {
            post.description = description;
        }
        if let Some(date) = input.date {
            post.date = Post::parse_display_date(&date).map_err(|_| {
                PostServiceError::ValidationError(format!(
                    "Invalid date '{}', expected dd/mm/yy",
                    date
                ))
            })?;
        }
        if input.category_id.is_some() {
            post.category_id = input.category_id;
        }

        self.repo
            .update(&post)
            .await
            .context("Failed to update post")?;

        if let Some(tag_ids) = input.tag_ids {
            self.repo
                .sync_tags(post.id, &tag_ids)
                .await
                .context("Failed to update tags")?;
        }

        self.get(id).await
    }

    /// Delete a post, returning it so callers can clean up its image file.
    pub async fn delete(&self, id: i64) -> Result<Post, PostServiceError> {
        let post = self.get(id).await?;
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete post")?;
        if !deleted {
            return Err(PostServiceError::NotFound(format!(
                "Post with ID {} not found",
                id
            )));
        }
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get(&self, id: i64) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post with ID {} not found", id)))
    }

    /// Get a post by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post '{}' not found", slug)))
    }

    /// Look up a post by slug for public display, counting the view.
    pub async fn view(&self, slug: &str) -> Result<Post, PostServiceError> {
        let mut post = self.get_by_slug(slug).await?;
        self.repo
            .increment_views(post.id)
            .await
            .context("Failed to count view")?;
        post.views += 1;
        Ok(post)
    }

    /// List posts, newest first
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<Post>, PostServiceError> {
        self.repo
            .list(params)
            .await
            .context("Failed to list posts")
            .map_err(Into::into)
    }

    /// List posts in a category
    pub async fn list_by_category(
        &self,
        category_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        self.repo
            .list_by_category(category_id, params)
            .await
            .context("Failed to list posts by category")
            .map_err(Into::into)
    }

    /// List posts carrying a tag
    pub async fn list_by_tag(
        &self,
        tag_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        self.repo
            .list_by_tag(tag_id, params)
            .await
            .context("Failed to list posts by tag")
            .map_err(Into::into)
    }

    /// Set the publish flag: `true` makes the post public, `false` a draft.
    pub async fn set_public(&self, id: i64, public: bool) -> Result<(), PostServiceError> {
        self.get(id).await?;
        self.repo
            .set_status(id, PostStatus::from_flag(public))
            .await
            .context("Failed to set post status")
            .map_err(Into::into)
    }

    /// Set the featured flag
    pub async fn set_featured(&self, id: i64, featured: bool) -> Result<(), PostServiceError> {
        self.get(id).await?;
        self.repo
            .set_featured(id, featured)
            .await
            .context("Failed to set featured flag")
            .map_err(Into::into)
    }

    /// Move a post into a category
    pub async fn set_category(&self, id: i64, category_id: i64) -> Result<(), PostServiceError> {
        self.get(id).await?;
        self.repo
            .set_category(id, category_id)
            .await
            .context("Failed to set category")
            .map_err(Into::into)
    }

    /// Replace the post's tag set
    pub async fn set_tags(&self, id: i64, tag_ids: &[i64]) -> Result<(), PostServiceError> {
        self.get(id).await?;
        self.repo
            .sync_tags(id, tag_ids)
            .await
            .context("Failed to set tags")
            .map_err(Into::into)
    }

    /// Record (or clear) the stored image filename, returning the previous
    /// one so the caller can delete the file.
    pub async fn set_image(
        &self,
        id: i64,
        image: Option<&str>,
    ) -> Result<Option<String>, PostServiceError> {
        let post = self.get(id).await?;
        self.repo
            .set_image(id, image)
            .await
            .context("Failed to set image")?;
        Ok(post.image)
    }

    /// The post preceding this one in id order
    pub async fn previous(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        self.repo
            .previous(id)
            .await
            .context("Failed to get previous post")
            .map_err(Into::into)
    }

    /// The post following this one in id order
    pub async fn next(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        self.repo
            .next(id)
            .await
            .context("Failed to get next post")
            .map_err(Into::into)
    }

    /// Top posts by view count
    pub async fn popular(&self) -> Result<Vec<Post>, PostServiceError> {
        self.repo
            .popular(POPULAR_LIMIT)
            .await
            .context("Failed to get popular posts")
            .map_err(Into::into)
    }

    /// Posts flagged as featured
    pub async fn featured(&self) -> Result<Vec<Post>, PostServiceError> {
        self.repo
            .featured(FEATURED_LIMIT)
            .await
            .context("Failed to get featured posts")
            .map_err(Into::into)
    }

    /// Latest posts by display date
    pub async fn recent(&self) -> Result<Vec<Post>, PostServiceError> {
        self.repo
            .recent(RECENT_LIMIT)
            .await
            .context("Failed to get recent posts")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::create_test_pool;
    use crate::db::repositories::{SqlxPostRepository, SqlxUserRepository, UserRepository};
    use crate::models::User;

    async fn setup() -> PostService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");

        // First user gets id 1, the default author
        let users = SqlxUserRepository::new(pool.clone());
        users
            .create(&User::new(
                "Author".to_string(),
                "author@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create author");

        PostService::new(SqlxPostRepository::boxed(pool))
    }

    fn input(title: &str) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: "Body".to_string(),
            description: None,
            date: "25/12/23".to_string(),
            author_id: None,
            category_id: None,
            tag_ids: None,
        }
    }

    #[tokio::test]
    async fn test_create_generates_slug_and_defaults() {
        let service = setup().await;

        let post = service.create(input("Hello World")).await.unwrap();
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.user_id, DEFAULT_AUTHOR_ID);
        assert_eq!(post.display_date(), "25/12/23");
    }

    #[tokio::test]
    async fn test_create_deduplicates_slug() {
        let service = setup().await;

        let first = service.create(input("Same Title")).await.unwrap();
        let second = service.create(input("Same Title")).await.unwrap();
        let third = service.create(input("Same Title")).await.unwrap();

        assert_eq!(first.slug, "same-title");
        assert_eq!(second.slug, "same-title-2");
        assert_eq!(third.slug, "same-title-3");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = setup().await;
        let result = service.create(input("   ")).await;
        assert!(matches!(
            result,
            Err(PostServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_iso_date() {
        let service = setup().await;
        let mut bad = input("Title");
        bad.date = "2023-12-25".to_string();
        let result = service.create(bad).await;
        assert!(matches!(
            result,
            Err(PostServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_title_regenerates_slug() {
        let service = setup().await;
        let post = service.create(input("Old Title")).await.unwrap();

        let updated = service
            .update(
                post.id,
                UpdatePostInput {
                    title: Some("New Title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.slug, "new-title");
        assert_eq!(updated.content, "Body");
    }

    #[tokio::test]
    async fn test_update_same_title_keeps_slug() {
        let service = setup().await;
        let post = service.create(input("Stable")).await.unwrap();

        let updated = service
            .update(
                post.id,
                UpdatePostInput {
                    title: Some("Stable".to_string()),
                    content: Some("Revised".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, post.slug);
        assert_eq!(updated.content, "Revised");
    }

    #[tokio::test]
    async fn test_set_public_toggle() {
        let service = setup().await;
        let post = service.create(input("Toggle")).await.unwrap();

        service.set_public(post.id, true).await.unwrap();
        assert_eq!(service.get(post.id).await.unwrap().status, PostStatus::Public);

        // Setting the same value again is a no-op
        service.set_public(post.id, true).await.unwrap();
        assert_eq!(service.get(post.id).await.unwrap().status, PostStatus::Public);

        service.set_public(post.id, false).await.unwrap();
        assert_eq!(service.get(post.id).await.unwrap().status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_view_increments_counter() {
        let service = setup().await;
        let post = service.create(input("Viewed")).await.unwrap();

        let viewed = service.view(&post.slug).await.unwrap();
        assert_eq!(viewed.views, 1);

        let viewed = service.view(&post.slug).await.unwrap();
        assert_eq!(viewed.views, 2);
    }

    #[tokio::test]
    async fn test_view_unknown_slug_is_not_found() {
        let service = setup().await;
        let result = service.view("nope").await;
        assert!(matches!(result, Err(PostServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup().await;
        let result = service.delete(99999).await;
        assert!(matches!(result, Err(PostServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_image_returns_previous() {
        let service = setup().await;
        let post = service.create(input("Pictured")).await.unwrap();

        let old = service.set_image(post.id, Some("a.png")).await.unwrap();
        assert!(old.is_none());

        let old = service.set_image(post.id, Some("b.png")).await.unwrap();
        assert_eq!(old.as_deref(), Some("a.png"));

        let post = service.get(post.id).await.unwrap();
        assert_eq!(post.image_url(), "/uploads/b.png");
    }

    #[tokio::test]
    async fn test_recent_orders_by_date() {
        let service = setup().await;

        let mut a = input("Older");
        a.date = "01/01/23".to_string();
        let mut b = input("Newest");
        b.date = "01/06/23".to_string();
        let mut c = input("Middle");
        c.date = "01/03/23".to_string();

        service.create(a).await.unwrap();
        let newest = service.create(b).await.unwrap();
        service.create(c).await.unwrap();

        let recent = service.recent().await.unwrap();
        assert_eq!(recent[0].id, newest.id);
        assert_eq!(recent.len(), 3);
    }
}
