//! Comment endpoints
//!
//! Logged-in readers post comments; they are held for moderation and only
//! appear under the post once an admin allows them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::CommentResponse;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    /// Comment body
    pub message: String,
}

/// POST /comments - add a comment (requires login)
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let comment = state
        .comment_service
        .add(req.post_id, user.0.id, &req.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "comment": CommentResponse::from(&comment),
            "message": "Your comment is awaiting moderation",
        })),
    ))
}

/// GET /posts/{id}/comments - allowed comments on a post
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state.comment_service.list_public(post_id).await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}
