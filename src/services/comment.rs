//! Comment service
//!
//! Comments are written by logged-in readers and held for moderation:
//! they start pending and only show publicly once allowed.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentStatus};

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment or its post not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Add a comment to a post. New comments start pending.
    pub async fn add(
        &self,
        post_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment cannot be empty".to_string(),
            ));
        }

        self.posts
            .get_by_id(post_id)
            .await
            .context("Failed to check post")?
            .ok_or_else(|| {
                CommentServiceError::NotFound(format!("Post with ID {} not found", post_id))
            })?;

        self.comments
            .create(&Comment::new(text.to_string(), post_id, user_id))
            .await
            .context("Failed to create comment")
            .map_err(Into::into)
    }

    /// Comments visible to readers: allowed ones only, oldest first.
    pub async fn list_public(&self, post_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        self.comments
            .list_for_post_with_status(post_id, CommentStatus::Allowed)
            .await
            .context("Failed to list public comments")
            .map_err(Into::into)
    }

    /// All comments on a post regardless of status.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        self.comments
            .list_for_post(post_id)
            .await
            .context("Failed to list comments")
            .map_err(Into::into)
    }

    /// The moderation queue: every comment, newest first.
    pub async fn list(&self) -> Result<Vec<Comment>, CommentServiceError> {
        self.comments
            .list()
            .await
            .context("Failed to list comments")
            .map_err(Into::into)
    }

    /// Set the moderation flag: `true` allows the comment, `false` returns
    /// it to pending.
    pub async fn set_allowed(&self, id: i64, allow: bool) -> Result<(), CommentServiceError> {
        self.get(id).await?;
        self.comments
            .set_status(id, CommentStatus::from_flag(allow))
            .await
            .context("Failed to set comment status")
            .map_err(Into::into)
    }

    /// Get comment by ID
    pub async fn get(&self, id: i64) -> Result<Comment, CommentServiceError> {
        self.comments
            .get_by_id(id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| {
                CommentServiceError::NotFound(format!("Comment with ID {} not found", id))
            })
    }

    /// Delete a comment
    pub async fn delete(&self, id: i64) -> Result<(), CommentServiceError> {
        let comment = self.get(id).await?;
        self.comments
            .delete(comment.id)
            .await
            .context("Failed to delete comment")?;
        Ok(())
    }
}
