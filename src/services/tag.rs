//! Tag service

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::TagRepository;
use crate::models::Tag;
use crate::services::slug::{generate_slug, unique_slug};

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Create a tag with a slug derived from the title.
    pub async fn create(&self, title: &str) -> Result<Tag, TagServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TagServiceError::ValidationError(
                "Tag title cannot be empty".to_string(),
            ));
        }

        let base = generate_slug(title);
        if base.is_empty() {
            return Err(TagServiceError::ValidationError(
                "Title yields an empty slug".to_string(),
            ));
        }

        let repo = &self.repo;
        let slug = unique_slug(&base, |candidate| async move {
            repo.slug_exists(&candidate).await
        })
        .await
        .context("Failed to find a free slug")?;

        self.repo
            .create(&Tag::new(title.to_string(), slug))
            .await
            .context("Failed to create tag")
            .map_err(Into::into)
    }

    /// Rename a tag, regenerating its slug.
    pub async fn rename(&self, id: i64, title: &str) -> Result<Tag, TagServiceError> {
        let mut tag = self.get(id).await?;

        let title = title.trim();
        if title.is_empty() {
            return Err(TagServiceError::ValidationError(
                "Tag title cannot be empty".to_string(),
            ));
        }

        if title != tag.title {
            let base = generate_slug(title);
            if base.is_empty() {
                return Err(TagServiceError::ValidationError(
                    "Title yields an empty slug".to_string(),
                ));
            }
            let repo = &self.repo;
            let current = tag.slug.clone();
            tag.slug = unique_slug(&base, |candidate| {
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
        tag.title = title.to_string();

        self.repo.update(&tag).await.context("Failed to update tag")?;
        Ok(tag)
    }

    /// Get tag by ID
    pub async fn get(&self, id: i64) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| TagServiceError::NotFound(format!("Tag with ID {} not found", id)))
    }

    /// Get tag by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get tag by slug")?
            .ok_or_else(|| TagServiceError::NotFound(format!("Tag '{}' not found", slug)))
    }

    /// List all tags ordered by title
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list tags")
            .map_err(Into::into)
    }

    /// Tags attached to a post
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Tag>, TagServiceError> {
        self.repo
            .list_for_post(post_id)
            .await
            .context("Failed to list tags for post")
            .map_err(Into::into)
    }

    /// Delete a tag. Its post links are removed via cascade.
    pub async fn delete(&self, id: i64) -> Result<(), TagServiceError> {
        let tag = self.get(id).await?;
        self.repo
            .delete(tag.id)
            .await
            .context("Failed to delete tag")?;
        Ok(())
    }
}
