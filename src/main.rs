//! Scriptum - a small blog engine

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scriptum::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SessionRepository, SqlxCategoryRepository, SqlxCommentRepository,
            SqlxPostRepository, SqlxSessionRepository, SqlxSubscriptionRepository,
            SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{
        CategoryService, CommentService, ImageStore, PostService, SubscriptionService,
        TagService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scriptum=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Scriptum...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Drop sessions that expired while the server was down
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let purged = session_repo.delete_expired().await?;
    if purged > 0 {
        tracing::info!("Purged {} expired sessions", purged);
    }

    // Wire repositories into services
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let state = AppState {
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
            session_repo,
        )),
        subscription_service: Arc::new(SubscriptionService::new(
            SqlxSubscriptionRepository::boxed(pool),
        )),
        image_store: Arc::new(ImageStore::new(config.upload.clone())),
    };

    let app = api::build_router(state, &config.server.cors_origin, &config.upload.path);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
