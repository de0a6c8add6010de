//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for the draft/public lifecycle
//! - Input types for creating and updating posts
//! - Pagination types for list queries
//!
//! Dates are stored canonically as `NaiveDate` (ISO `YYYY-MM-DD` in the
//! database) and presented externally in `dd/mm/yy` display form. The two
//! conversions round-trip losslessly for valid input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::upload_url;

/// Format used when presenting a post date to clients.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%y";

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly slug (unique, derived from title)
    pub slug: String,
    /// Post body
    pub content: String,
    /// Short description shown in listings
    pub description: String,
    /// Category ID (posts may be uncategorized)
    pub category_id: Option<i64>,
    /// Author user ID
    pub user_id: i64,
    /// Publication status
    pub status: PostStatus,
    /// View count
    #[serde(default)]
    pub views: i64,
    /// Whether the post is flagged for highlighted display
    #[serde(default)]
    pub is_featured: bool,
    /// Publication date (canonical form)
    pub date: NaiveDate,
    /// Stored image filename, if one was uploaded
    #[serde(default)]
    pub image: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(
        title: String,
        slug: String,
        content: String,
        description: String,
        user_id: i64,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            slug,
            content,
            description,
            category_id: None,
            user_id,
            status: PostStatus::Draft,
            views: 0,
            is_featured: false,
            date,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public URL of the post image, or the placeholder when none is stored.
    pub fn image_url(&self) -> String {
        upload_url(self.image.as_deref())
    }

    /// Post date in `dd/mm/yy` display form.
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    /// Parse a `dd/mm/yy` display date into the canonical form.
    pub fn parse_display_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(value, DISPLAY_DATE_FORMAT)
    }
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not yet published
    #[default]
    Draft,
    /// Public - visible to readers
    Public,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Public => "public",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "public" => Some(PostStatus::Public),
            _ => None,
        }
    }

    /// Map an explicit publish flag onto a status.
    pub fn from_flag(public: bool) -> Self {
        if public {
            PostStatus::Public
        } else {
            PostStatus::Draft
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Short description (optional)
    #[serde(default)]
    pub description: Option<String>,
    /// Publication date in `dd/mm/yy` display form
    pub date: String,
    /// Author user ID (defaults to the system author when absent)
    #[serde(default)]
    pub author_id: Option<i64>,
    /// Category ID (optional)
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Tag IDs to associate (optional)
    #[serde(default)]
    pub tag_ids: Option<Vec<i64>>,
}

/// Input for updating an existing post; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    /// New publication date in `dd/mm/yy` display form
    pub date: Option<String>,
    pub category_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries.
    ///
    /// Computed in `i64` so an arbitrary `page` from a query string cannot
    /// overflow `u32`.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1) as i64 * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages.
    ///
    /// Computed in `u64` so a large `total` neither truncates nor overflows.
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let pages =
            (self.total.max(0) as u64 + self.per_page as u64 - 1) / self.per_page as u64;
        pages.min(u32::MAX as u64) as u32
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}
