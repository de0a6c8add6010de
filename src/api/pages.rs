//! Public page endpoints
//!
//! The reader-facing surface: home page selections, the paginated post
//! index, single posts (which count a view and carry navigation links),
//! and category/tag listings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{CommentResponse, PostPageResponse, PostResponse};
use crate::models::ListParams;

/// Posts per page on the public index.
pub const PAGE_SIZE: u32 = 2;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

impl PageQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), PAGE_SIZE)
    }
}

/// GET / - paginated post index plus the home page selections
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let posts = state.post_service.list(&query.params()).await?;
    let popular = state.post_service.popular().await?;
    let featured = state.post_service.featured().await?;
    let recent = state.post_service.recent().await?;
    let categories = state.category_service.list().await?;
    let tags = state.tag_service.list().await?;

    Ok(Json(json!({
        "posts": PostPageResponse::from(&posts),
        "popular": popular.iter().map(PostResponse::from).collect::<Vec<_>>(),
        "featured": featured.iter().map(PostResponse::from).collect::<Vec<_>>(),
        "recent": recent.iter().map(PostResponse::from).collect::<Vec<_>>(),
        "categories": categories,
        "tags": tags,
    })))
}

/// GET /posts - paginated post index
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPageResponse>, ApiError> {
    let page = state.post_service.list(&query.params()).await?;
    Ok(Json(PostPageResponse::from(&page)))
}

/// GET /post/{slug} - single post with navigation and allowed comments.
///
/// Each request counts as a view.
pub async fn show_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = state.post_service.view(&slug).await?;
    let previous = state.post_service.previous(post.id).await?;
    let next = state.post_service.next(post.id).await?;
    let tags = state.tag_service.list_for_post(post.id).await?;
    let comments = state.comment_service.list_public(post.id).await?;

    Ok(Json(json!({
        "post": PostResponse::from(&post),
        "previous": previous.as_ref().map(PostResponse::from),
        "next": next.as_ref().map(PostResponse::from),
        "tags": tags,
        "comments": comments.iter().map(CommentResponse::from).collect::<Vec<_>>(),
    })))
}

/// GET /category/{slug} - posts in a category
pub async fn show_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let category = state.category_service.get_by_slug(&slug).await?;
    let page = state
        .post_service
        .list_by_category(category.id, &query.params())
        .await?;

    Ok(Json(json!({
        "category": category,
        "posts": PostPageResponse::from(&page),
    })))
}

/// GET /tag/{slug} - posts carrying a tag
pub async fn show_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tag = state.tag_service.get_by_slug(&slug).await?;
    let page = state
        .post_service
        .list_by_tag(tag.id, &query.params())
        .await?;

    Ok(Json(json!({
        "tag": tag,
        "posts": PostPageResponse::from(&page),
    })))
}
