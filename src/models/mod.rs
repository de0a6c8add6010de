//! Data models
//!
//! This module contains the data structures used throughout Scriptum.
//! Models represent:
//! - Database entities (Post, Category, Tag, Comment, User, Subscription, Session)
//! - Input types consumed by the service layer
//! - Pagination containers for list queries

mod category;
mod comment;
mod post;
mod session;
mod subscription;
mod tag;
mod user;

pub use category::Category;
pub use comment::{Comment, CommentStatus};
pub use post::{
    CreatePostInput, ListParams, PagedResult, Post, PostStatus, UpdatePostInput,
    DISPLAY_DATE_FORMAT,
};
pub use session::Session;
pub use subscription::{Subscription, TOKEN_LENGTH};
pub use tag::Tag;
pub use user::{CreateUserInput, UpdateProfileInput, User, UserStatus};

/// Default placeholder served when no image/avatar is stored.
pub const NO_IMAGE_URL: &str = "/img/no-image.png";

/// Resolve the public URL for an uploaded filename.
pub(crate) fn upload_url(filename: Option<&str>) -> String {
    match filename {
        Some(name) => format!("/uploads/{}", name),
        None => NO_IMAGE_URL.to_string(),
    }
}
