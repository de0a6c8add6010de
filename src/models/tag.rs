//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity
///
/// Tags label posts across categories through the `post_tags` join table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag title
    pub title: String,
    /// URL-friendly slug (unique, derived from title)
    pub slug: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new tag; the ID is assigned by the database.
    pub fn new(title: String, slug: String) -> Self {
        Self {
            id: 0,
            title,
            slug,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("Async".to_string(), "async".to_string());
        assert_eq!(tag.id, 0);
        assert_eq!(tag.title, "Async");
        assert_eq!(tag.slug, "async");
    }
}
