//! Repository layer
//!
//! One trait per aggregate with a sqlx-backed implementation. Services depend
//! on the traits (`Arc<dyn XxxRepository>`) so tests can run against the
//! in-memory database.

pub mod category;
pub mod comment;
pub mod post;
pub mod session;
pub mod subscription;
pub mod tag;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use subscription::{SqlxSubscriptionRepository, SubscriptionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::create_test_pool;
    use crate::models::{Post, User};
    use chrono::NaiveDate;
    use sqlx::SqlitePool;

    async fn setup() -> SqlitePool {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");
        pool
    }

    async fn seed_user(pool: &SqlitePool) -> User {
        let repo = SqlxUserRepository::new(pool.clone());
        repo.create(&User::new(
            "Author".to_string(),
            "author@example.com".to_string(),
            "hash".to_string(),
        ))
        .await
        .expect("Failed to create user")
    }

    fn sample_post(n: u32, user_id: i64) -> Post {
        Post::new(
            format!("Post {}", n),
            format!("post-{}", n),
            "content".to_string(),
            String::new(),
            user_id,
            NaiveDate::from_ymd_opt(2023, 1, n).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_post_create_and_fetch() {
        let pool = setup().await;
        let user = seed_user(&pool).await;
        let repo = SqlxPostRepository::new(pool.clone());

        let created = repo.create(&sample_post(1, user.id)).await.unwrap();
        assert!(created.id > 0);

        let by_slug = repo.get_by_slug("post-1").await.unwrap().unwrap();
        assert_eq!(by_slug.id, created.id);
        assert_eq!(by_slug.title, "Post 1");
        assert_eq!(by_slug.views, 0);
    }

    #[tokio::test]
    async fn test_previous_and_next_skip_gaps() {
        let pool = setup().await;
        let user = seed_user(&pool).await;
        let repo = SqlxPostRepository::new(pool.clone());

        let mut ids = Vec::new();
        for n in 1..=4 {
            ids.push(repo.create(&sample_post(n, user.id)).await.unwrap().id);
        }
        // Leave a gap in the id sequence
        assert!(repo.delete(ids[1]).await.unwrap());

        let prev = repo.previous(ids[2]).await.unwrap().unwrap();
        assert_eq!(prev.id, ids[0]);

        let next = repo.next(ids[2]).await.unwrap().unwrap();
        assert_eq!(next.id, ids[3]);

        assert!(repo.previous(ids[0]).await.unwrap().is_none());
        assert!(repo.next(ids[3]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_tags_replaces_link_set() {
        let pool = setup().await;
        let user = seed_user(&pool).await;
        let posts = SqlxPostRepository::new(pool.clone());
        let tags = SqlxTagRepository::new(pool.clone());

        let post = posts.create(&sample_post(1, user.id)).await.unwrap();
        let mut tag_ids = Vec::new();
        for name in ["rust", "sqlite", "axum"] {
            let tag = tags
                .create(&crate::models::Tag::new(name.to_string(), name.to_string()))
                .await
                .unwrap();
            tag_ids.push(tag.id);
        }

        posts
            .sync_tags(post.id, &[tag_ids[0], tag_ids[1]])
            .await
            .unwrap();
        assert_eq!(
            posts.tag_ids(post.id).await.unwrap(),
            vec![tag_ids[0], tag_ids[1]]
        );

        posts
            .sync_tags(post.id, &[tag_ids[1], tag_ids[2]])
            .await
            .unwrap();
        assert_eq!(
            posts.tag_ids(post.id).await.unwrap(),
            vec![tag_ids[1], tag_ids[2]]
        );

        posts.sync_tags(post.id, &[]).await.unwrap();
        assert!(posts.tag_ids(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_popular_orders_by_views() {
        let pool = setup().await;
        let user = seed_user(&pool).await;
        let repo = SqlxPostRepository::new(pool.clone());

        let a = repo.create(&sample_post(1, user.id)).await.unwrap();
        let b = repo.create(&sample_post(2, user.id)).await.unwrap();
        let c = repo.create(&sample_post(3, user.id)).await.unwrap();

        for _ in 0..5 {
            repo.increment_views(b.id).await.unwrap();
        }
        for _ in 0..2 {
            repo.increment_views(c.id).await.unwrap();
        }

        let popular = repo.popular(3).await.unwrap();
        let ids: Vec<i64> = popular.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[tokio::test]
    async fn test_category_delete_sets_post_category_null() {
        let pool = setup().await;
        let user = seed_user(&pool).await;
        let posts = SqlxPostRepository::new(pool.clone());
        let categories = SqlxCategoryRepository::new(pool.clone());

        let category = categories
            .create(&crate::models::Category::new(
                "News".to_string(),
                "news".to_string(),
            ))
            .await
            .unwrap();

        let post = posts.create(&sample_post(1, user.id)).await.unwrap();
        posts.set_category(post.id, category.id).await.unwrap();

        assert!(categories.delete(category.id).await.unwrap());

        let reloaded = posts.get_by_id(post.id).await.unwrap().unwrap();
        assert!(reloaded.category_id.is_none());
    }

    #[tokio::test]
    async fn test_email_taken_excludes_self() {
        let pool = setup().await;
        let repo = SqlxUserRepository::new(pool.clone());

        let user = repo
            .create(&User::new(
                "A".to_string(),
                "a@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        assert!(repo.email_taken("a@example.com", None).await.unwrap());
        assert!(!repo
            .email_taken("a@example.com", Some(user.id))
            .await
            .unwrap());
        assert!(!repo.email_taken("b@example.com", None).await.unwrap());
    }
}
