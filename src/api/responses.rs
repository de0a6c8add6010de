//! API response shapes
//!
//! Wire representations of the domain entities: dates go out in display
//! form, image and avatar fields become URLs, and password hashes never
//! leave the service layer.

use serde::Serialize;

use crate::models::{Comment, PagedResult, Post, Subscription, User};

/// Post as presented to clients
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub status: String,
    pub views: i64,
    pub is_featured: bool,
    /// Publication date in `dd/mm/yy` form
    pub date: String,
    pub image_url: String,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            description: post.description.clone(),
            category_id: post.category_id,
            user_id: post.user_id,
            status: post.status.to_string(),
            views: post.views,
            is_featured: post.is_featured,
            date: post.display_date(),
            image_url: post.image_url(),
        }
    }
}

/// Comment as presented to clients
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub post_id: i64,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text.clone(),
            user_id: comment.user_id,
            post_id: comment.post_id,
            status: comment.status.to_string(),
            created_at: comment.created_at,
        }
    }
}

/// User as presented to clients
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub status: String,
    pub avatar_url: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            status: user.status.to_string(),
            avatar_url: user.avatar_url(),
        }
    }
}

/// Subscription as presented to the admin panel
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id,
            email: subscription.email.clone(),
            created_at: subscription.created_at,
        }
    }
}

/// Paginated page of post responses
#[derive(Debug, Serialize)]
pub struct PostPageResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<&PagedResult<Post>> for PostPageResponse {
    fn from(page: &PagedResult<Post>) -> Self {
        Self {
            posts: page.items.iter().map(PostResponse::from).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_post_response_formats_date_and_image() {
        let mut post = Post::new(
            "T".to_string(),
            "t".to_string(),
            "c".to_string(),
            String::new(),
            1,
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap(),
        );
        post.image = Some("x.png".to_string());

        let response = PostResponse::from(&post);
        assert_eq!(response.date, "25/12/23");
        assert_eq!(response.image_url, "/uploads/x.png");
        assert_eq!(response.status, "draft");
    }

    #[test]
    fn test_user_response_has_no_password_hash() {
        let user = User::new("A".into(), "a@b.c".into(), "secret".into());
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("/img/no-image.png"));
    }
}
