//! Admin endpoints
//!
//! The management surface behind `require_auth` + `require_admin`: post
//! CRUD with image upload, publish/feature toggles, category and tag
//! management, comment moderation, user administration, and the
//! subscriber list.
//!
//! Toggle endpoints take an explicit flag in the request body; an absent
//! flag means `false`, so the same request always produces the same state.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};
use crate::api::pages::PageQuery;
use crate::api::responses::{
    CommentResponse, PostPageResponse, PostResponse, SubscriptionResponse, UserResponse,
};
use crate::models::{Category, CreatePostInput, CreateUserInput, ListParams, Tag, UpdatePostInput};

/// Posts per page in the admin panel.
const ADMIN_PAGE_SIZE: u32 = 10;

/// Build the admin router. Auth layers are applied by the caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/posts/{id}/image", post(upload_post_image))
        .route("/posts/{id}/status", put(set_post_status))
        .route("/posts/{id}/featured", put(set_post_featured))
        .route("/posts/{id}/category", put(set_post_category))
        .route("/posts/{id}/tags", put(set_post_tags))
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(rename_category).delete(delete_category),
        )
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", put(rename_tag).delete(delete_tag))
        .route("/comments", get(list_comments))
        .route("/comments/{id}/status", put(set_comment_status))
        .route("/comments/{id}", delete(delete_comment))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/admin", put(set_user_admin))
        .route("/users/{id}/ban", put(set_user_ban))
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions/{id}", delete(delete_subscription))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPageResponse>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), ADMIN_PAGE_SIZE);
    let page = state.post_service.list(&params).await?;
    Ok(Json(PostPageResponse::from(&page)))
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = state.post_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(&post))))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = state.post_service.get(id).await?;
    let tags = state.tag_service.list_for_post(id).await?;
    let comments = state.comment_service.list_for_post(id).await?;

    Ok(Json(json!({
        "post": PostResponse::from(&post),
        "tags": tags,
        "comments": comments.iter().map(CommentResponse::from).collect::<Vec<_>>(),
    })))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.update(id, input).await?;
    Ok(Json(PostResponse::from(&post)))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Image file goes first so a stored upload never outlives its row
    let post = state.post_service.get(id).await?;
    if let Some(image) = &post.image {
        state.image_store.delete(image).await?;
    }
    state.post_service.delete(id).await?;
    Ok(Json(json!({ "message": "Post deleted" })))
}

async fn upload_post_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<PostResponse>, ApiError> {
    // Reject unknown posts before anything touches the upload directory
    state.post_service.get(id).await?;

    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Invalid form data: {}", e)))?
    {
        if field.name() == Some("image") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|e| {
                ApiError::validation_error(format!("Invalid image upload: {}", e))
            })?;
            if !data.is_empty() {
                upload = Some((data.to_vec(), content_type));
            }
        }
    }

    // No file attached: leave the post untouched.
    if let Some((data, content_type)) = upload {
        let filename = state.image_store.save(&data, &content_type).await?;
        let previous = state.post_service.set_image(id, Some(&filename)).await?;
        if let Some(previous) = previous {
            state.image_store.delete(&previous).await?;
        }
    }

    let post = state.post_service.get(id).await?;
    Ok(Json(PostResponse::from(&post)))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    #[serde(default)]
    public: bool,
}

async fn set_post_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    state.post_service.set_public(id, req.public).await?;
    let post = state.post_service.get(id).await?;
    Ok(Json(PostResponse::from(&post)))
}

#[derive(Debug, Deserialize)]
struct FeaturedRequest {
    #[serde(default)]
    featured: bool,
}

async fn set_post_featured(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FeaturedRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    state.post_service.set_featured(id, req.featured).await?;
    let post = state.post_service.get(id).await?;
    Ok(Json(PostResponse::from(&post)))
}

#[derive(Debug, Deserialize)]
struct CategoryAssignRequest {
    category_id: i64,
}

async fn set_post_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryAssignRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    state.category_service.get(req.category_id).await?;
    state.post_service.set_category(id, req.category_id).await?;
    let post = state.post_service.get(id).await?;
    Ok(Json(PostResponse::from(&post)))
}

#[derive(Debug, Deserialize)]
struct TagsAssignRequest {
    #[serde(default)]
    tag_ids: Vec<i64>,
}

async fn set_post_tags(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TagsAssignRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.post_service.set_tags(id, &req.tag_ids).await?;
    let tags = state.tag_service.list_for_post(id).await?;
    Ok(Json(json!({ "tags": tags })))
}

// ---------------------------------------------------------------------------
// Categories and tags
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TitleRequest {
    title: String,
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list().await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(&req.title).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn rename_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.category_service.rename(id, &req.title).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.category_service.delete(id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}

async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.tag_service.list().await?))
}

async fn create_tag(
    State(state): State<AppState>,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = state.tag_service.create(&req.title).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn rename_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(state.tag_service.rename(id, &req.title).await?))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.tag_service.delete(id).await?;
    Ok(Json(json!({ "message": "Tag deleted" })))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state.comment_service.list().await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
struct AllowRequest {
    #[serde(default)]
    allow: bool,
}

async fn set_comment_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AllowRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    state.comment_service.set_allowed(id, req.allow).await?;
    let comment = state.comment_service.get(id).await?;
    Ok(Json(CommentResponse::from(&comment)))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.comment_service.delete(id).await?;
    Ok(Json(json!({ "message": "Comment deleted" })))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.user_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.user_service.delete(id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

#[derive(Debug, Deserialize)]
struct AdminRequest {
    #[serde(default)]
    admin: bool,
}

async fn set_user_admin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state.user_service.set_admin(id, req.admin).await?;
    let user = state.user_service.get(id).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[derive(Debug, Deserialize)]
struct BanRequest {
    #[serde(default)]
    banned: bool,
}

async fn set_user_ban(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<BanRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state.user_service.set_banned(id, req.banned).await?;
    let user = state.user_service.get(id).await?;
    Ok(Json(UserResponse::from(&user)))
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriptions = state.subscription_service.list().await?;
    Ok(Json(
        subscriptions.iter().map(SubscriptionResponse::from).collect(),
    ))
}

async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.subscription_service.remove(id).await?;
    Ok(Json(json!({ "message": "Subscription deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::create_test_pool;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxCommentRepository, SqlxPostRepository, SqlxSessionRepository,
        SqlxSubscriptionRepository, SqlxTagRepository, SqlxUserRepository, UserRepository,
    };
    use crate::models::User;
    use crate::services::{
        CategoryService, CommentService, ImageStore, PostService, SubscriptionService, TagService,
        UserService,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn state_with_uploads(dir: &std::path::Path) -> AppState {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");

        // First user gets id 1, the default author
        SqlxUserRepository::new(pool.clone())
            .create(&User::new(
                "Author".to_string(),
                "author@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create author");

        let post_repo = SqlxPostRepository::boxed(pool.clone());
        AppState {
            post_service: Arc::new(PostService::new(post_repo.clone())),
            category_service: Arc::new(CategoryService::new(SqlxCategoryRepository::boxed(
                pool.clone(),
            ))),
            tag_service: Arc::new(TagService::new(SqlxTagRepository::boxed(pool.clone()))),
            comment_service: Arc::new(CommentService::new(
                SqlxCommentRepository::boxed(pool.clone()),
                post_repo,
            )),
            user_service: Arc::new(UserService::new(
                SqlxUserRepository::boxed(pool.clone()),
                SqlxSessionRepository::boxed(pool.clone()),
            )),
            subscription_service: Arc::new(SubscriptionService::new(
                SqlxSubscriptionRepository::boxed(pool),
            )),
            image_store: Arc::new(ImageStore::new(UploadConfig {
                path: dir.to_path_buf(),
                ..UploadConfig::default()
            })),
        }
    }

    fn post_input(title: &str) -> CreatePostInput {
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

    fn multipart_image_request(uri: &str) -> Request<Body> {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\npng-bytes\r\n--{b}--\r\n",
            b = boundary
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_post_removes_stored_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_uploads(dir.path()).await;

        let post = state.post_service.create(post_input("Pictured")).await.unwrap();
        let filename = state.image_store.save(b"png-bytes", "image/png").await.unwrap();
        state
            .post_service
            .set_image(post.id, Some(&filename))
            .await
            .unwrap();
        assert!(dir.path().join(&filename).exists());

        delete_post(State(state.clone()), Path(post.id)).await.unwrap();

        assert!(!dir.path().join(&filename).exists());
        assert!(state.post_service.get(post.id).await.is_err());
    }

    #[tokio::test]
    async fn test_upload_image_unknown_post_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_uploads(dir.path()).await;
        let app = router().with_state(state);

        let response = app
            .oneshot(multipart_image_request("/posts/9999/image"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_image_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_uploads(dir.path()).await;

        let post = state.post_service.create(post_input("Pictured")).await.unwrap();
        let first = state.image_store.save(b"old", "image/png").await.unwrap();
        state
            .post_service
            .set_image(post.id, Some(&first))
            .await
            .unwrap();

        let app = router().with_state(state.clone());
        let uri = format!("/posts/{}/image", post.id);
        let response = app.oneshot(multipart_image_request(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!dir.path().join(&first).exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
