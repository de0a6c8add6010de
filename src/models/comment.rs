//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment moderation status
///
/// New comments start pending; only allowed comments are listed publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    Allowed,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Allowed => "allowed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(CommentStatus::Pending),
            "allowed" => Some(CommentStatus::Allowed),
            _ => None,
        }
    }

    /// Map an explicit allow flag onto a status.
    pub fn from_flag(allow: bool) -> Self {
        if allow {
            CommentStatus::Allowed
        } else {
            CommentStatus::Pending
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Comment body
    pub text: String,
    /// Author user ID
    pub user_id: i64,
    /// Post the comment belongs to
    pub post_id: i64,
    /// Moderation status
    pub status: CommentStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new pending comment; the ID is assigned by the database.
    pub fn new(text: String, post_id: i64, user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            text,
            user_id,
            post_id,
            status: CommentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment_is_pending() {
        let comment = Comment::new("Nice post".to_string(), 3, 7);
        assert_eq!(comment.status, CommentStatus::Pending);
        assert_eq!(comment.post_id, 3);
        assert_eq!(comment.user_id, 7);
    }

    #[test]
    fn test_status_from_flag() {
        assert_eq!(CommentStatus::from_flag(true), CommentStatus::Allowed);
        assert_eq!(CommentStatus::from_flag(false), CommentStatus::Pending);
    }
}
