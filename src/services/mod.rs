//! Service layer
//!
//! Business logic over the repository traits. Each service owns validation
//! and the rules for its aggregate; handlers translate service errors into
//! HTTP responses.

pub mod category;
pub mod comment;
pub mod password;
pub mod post;
pub mod slug;
pub mod storage;
pub mod subscription;
pub mod tag;
pub mod user;

pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use post::{PostService, PostServiceError};
pub use storage::{ImageStore, StorageError};
pub use subscription::{SubscriptionService, SubscriptionServiceError};
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
