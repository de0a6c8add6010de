//! Subscription repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Subscription;

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription, returning it with its assigned id
    async fn create(&self, subscription: &Subscription) -> Result<Subscription>;

    /// Get subscription by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>>;

    /// Get subscription by its token
    async fn get_by_token(&self, token: &str) -> Result<Option<Subscription>>;

    /// Get subscription by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Subscription>>;

    /// List all subscriptions, oldest first
    async fn list(&self) -> Result<Vec<Subscription>>;

    /// Store a token for a subscription
    async fn set_token(&self, id: i64, token: &str) -> Result<()>;

    /// Delete a subscription. Returns false when the row was already gone.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based subscription repository implementation
pub struct SqlxSubscriptionRepository {
    pool: SqlitePool,
}

impl SqlxSubscriptionRepository {
    /// Create a new SQLx subscription repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SubscriptionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SubscriptionRepository for SqlxSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO subscriptions (email, token, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&subscription.email)
        .bind(&subscription.token)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create subscription")?;

        let mut created = subscription.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            "SELECT id, email, token, created_at FROM subscriptions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get subscription by ID")?;

        Ok(row.map(|r| row_to_subscription(&r)))
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            "SELECT id, email, token, created_at FROM subscriptions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get subscription by token")?;

        Ok(row.map(|r| row_to_subscription(&r)))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            "SELECT id, email, token, created_at FROM subscriptions WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get subscription by email")?;

        Ok(row.map(|r| row_to_subscription(&r)))
    }

    async fn list(&self) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            "SELECT id, email, token, created_at FROM subscriptions ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscriptions")?;

        Ok(rows.iter().map(row_to_subscription).collect())
    }

    async fn set_token(&self, id: i64, token: &str) -> Result<()> {
        sqlx::query("UPDATE subscriptions SET token = ?, updated_at = ? WHERE id = ?")
            .bind(token)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set subscription token")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete subscription")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_subscription(row: &sqlx::sqlite::SqliteRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        email: row.get("email"),
        token: row.get("token"),
        created_at: row.get("created_at"),
    }
}
