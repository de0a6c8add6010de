//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories group posts; a post belongs to at most one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category title
    pub title: String,
    /// URL-friendly slug (unique, derived from title)
    pub slug: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category; the ID is assigned by the database.
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
    fn test_category_new() {
        let category = Category::new("Rust News".to_string(), "rust-news".to_string());
        assert_eq!(category.id, 0);
        assert_eq!(category.title, "Rust News");
        assert_eq!(category.slug, "rust-news");
    }
}
