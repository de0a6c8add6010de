//! API layer - HTTP handlers and routing
//!
//! Public reader surface, authenticated reader endpoints (comments,
//! profile), and the admin panel, plus static serving of uploaded images.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod middleware;
pub mod pages;
pub mod profile;
pub mod responses;
pub mod subscriptions;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin rights)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/comments", post(comments::create_comment))
        .route(
            "/profile",
            get(profile::show_profile).post(profile::update_profile),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/", get(pages::home))
        .route("/posts", get(pages::list_posts))
        .route("/post/{slug}", get(pages::show_post))
        .route("/post/{slug}/comments", get(show_post_comments))
        .route("/category/{slug}", get(pages::show_category))
        .route("/tag/{slug}", get(pages::show_tag))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/subscriptions", post(subscriptions::subscribe))
        .route("/unsubscribe/{token}", get(subscriptions::unsubscribe))
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Comments for a post addressed by slug.
async fn show_post_comments(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(slug): axum::extract::Path<String>,
) -> Result<axum::Json<Vec<responses::CommentResponse>>, ApiError> {
    let post = state.post_service.get_by_slug(&slug).await?;
    comments::list_comments(
        axum::extract::State(state),
        axum::extract::Path(post.id),
    )
    .await
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str, upload_dir: &std::path::Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .merge(build_api_router(state.clone()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
