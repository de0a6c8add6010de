//! Category service

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::CategoryRepository;
use crate::models::Category;
use crate::services::slug::{generate_slug, unique_slug};

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a category with a slug derived from the title.
    ///
    /// A taken slug gets a numeric suffix, so two categories may share a
    /// title but never a slug.
    pub async fn create(&self, title: &str) -> Result<Category, CategoryServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category title cannot be empty".to_string(),
            ));
        }

        let base = generate_slug(title);
        if base.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Title yields an empty slug".to_string(),
            ));
        }

        let repo = &self.repo;
        let slug = unique_slug(&base, |candidate| async move {
            repo.slug_exists(&candidate).await
        })
        .await
        .context("Failed to find a free slug")?;

        self.repo
            .create(&Category::new(title.to_string(), slug))
            .await
            .context("Failed to create category")
            .map_err(Into::into)
    }

    /// Rename a category, regenerating its slug.
    pub async fn rename(&self, id: i64, title: &str) -> Result<Category, CategoryServiceError> {
        let mut category = self.get(id).await?;

        let title = title.trim();
        if title.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category title cannot be empty".to_string(),
            ));
        }

        if title != category.title {
            let base = generate_slug(title);
            if base.is_empty() {
                return Err(CategoryServiceError::ValidationError(
                    "Title yields an empty slug".to_string(),
                ));
            }
            let repo = &self.repo;
            let current = category.slug.clone();
            category.slug = unique_slug(&base, |candidate| {
                let current = current.clone();
                async move {
                    if candidate == current {
                        return Ok(false);
                    }
                    repo.slug_exists(&candidate).await
                }
            })
            .await
            .context("Failed to find a free slug")?;
        }
        category.title = title.to_string();

        self.repo
            .update(&category)
            .await
            .context("Failed to update category")?;
        Ok(category)
    }

    /// Get category by ID
    pub async fn get(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| {
                CategoryServiceError::NotFound(format!("Category with ID {} not found", id))
            })
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category by slug")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// List all categories ordered by title
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list categories")
            .map_err(Into::into)
    }

    /// Delete a category. Posts in it become uncategorized.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self.get(id).await?;
        self.repo
            .delete(category.id)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::create_test_pool;
    use crate::db::repositories::SqlxCategoryRepository;

    async fn setup() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_generates_slug() {
        let service = setup().await;
        let category = service.create("Rust News").await.unwrap();
        assert!(category.id > 0);
        assert_eq!(category.slug, "rust-news");
    }

    #[tokio::test]
    async fn test_create_deduplicates_slug() {
        let service = setup().await;
        let first = service.create("News").await.unwrap();
        let second = service.create("News").await.unwrap();
        assert_eq!(first.slug, "news");
        assert_eq!(second.slug, "news-2");
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = setup().await;
        let result = service.create("  ").await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_regenerates_slug() {
        let service = setup().await;
        let category = service.create("Old Name").await.unwrap();
        let renamed = service.rename(category.id, "New Name").await.unwrap();
        assert_eq!(renamed.title, "New Name");
        assert_eq!(renamed.slug, "new-name");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup().await;
        let result = service.delete(42).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_ordered_by_title() {
        let service = setup().await;
        service.create("Zebra").await.unwrap();
        service.create("Apple").await.unwrap();

        let all = service.list().await.unwrap();
        assert_eq!(all[0].title, "Apple");
        assert_eq!(all[1].title, "Zebra");
    }
}
