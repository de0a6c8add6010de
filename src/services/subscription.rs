//! Subscription service
//!
//! Readers subscribe with an email address. Each subscription carries an
//! opaque random token used by the one-click unsubscribe link.

use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

use crate::db::repositories::SubscriptionRepository;
use crate::models::{Subscription, TOKEN_LENGTH};

/// Error types for subscription service operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionServiceError {
    /// Subscription not found
    #[error("Subscription not found: {0}")]
    NotFound(String),

    /// Email already subscribed
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Subscription service
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    /// Create a new subscription service
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    /// Subscribe an email address, generating its token up front.
    pub async fn subscribe(&self, email: &str) -> Result<Subscription, SubscriptionServiceError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(SubscriptionServiceError::ValidationError(format!(
                "Invalid email address: {}",
                email
            )));
        }

        if self
            .repo
            .get_by_email(&email)
            .await
            .context("Failed to check subscription")?
            .is_some()
        {
            return Err(SubscriptionServiceError::Conflict(format!(
                "Already subscribed: {}",
                email
            )));
        }

        self.repo
            .create(&Subscription::new(email, Some(generate_token())))
            .await
            .context("Failed to create subscription")
            .map_err(Into::into)
    }

    /// Return the subscription's token, generating one if it has none yet.
    pub async fn ensure_token(&self, id: i64) -> Result<String, SubscriptionServiceError> {
        let subscription = self.get(id).await?;

        if let Some(token) = subscription.token {
            return Ok(token);
        }

        let token = generate_token();
        self.repo
            .set_token(id, &token)
            .await
            .context("Failed to store token")?;
        Ok(token)
    }

    /// Get subscription by ID
    pub async fn get(&self, id: i64) -> Result<Subscription, SubscriptionServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get subscription")?
            .ok_or_else(|| {
                SubscriptionServiceError::NotFound(format!(
                    "Subscription with ID {} not found",
                    id
                ))
            })
    }

    /// List all subscriptions
    pub async fn list(&self) -> Result<Vec<Subscription>, SubscriptionServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list subscriptions")
            .map_err(Into::into)
    }

    /// Remove a subscription by ID
    pub async fn remove(&self, id: i64) -> Result<(), SubscriptionServiceError> {
        let subscription = self.get(id).await?;
        self.repo
            .delete(subscription.id)
            .await
            .context("Failed to delete subscription")?;
        Ok(())
    }

    /// Unsubscribe via the opaque token from the email link.
    pub async fn unsubscribe(&self, token: &str) -> Result<(), SubscriptionServiceError> {
        let subscription = self
            .repo
            .get_by_token(token)
            .await
            .context("Failed to look up token")?
            .ok_or_else(|| {
                SubscriptionServiceError::NotFound("Unknown unsubscribe token".to_string())
            })?;

        self.repo
            .delete(subscription.id)
            .await
            .context("Failed to delete subscription")?;
        Ok(())
    }
}

/// Generate an alphanumeric token for unsubscribe links.
fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::create_test_pool;
    use crate::db::repositories::SqlxSubscriptionRepository;

    async fn setup() -> SubscriptionService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");
        SubscriptionService::new(SqlxSubscriptionRepository::boxed(pool))
    }

    #[test]
    fn test_token_length_and_charset() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[tokio::test]
    async fn test_subscribe_generates_token() {
        let service = setup().await;
        let sub = service.subscribe("reader@example.com").await.unwrap();
        assert!(sub.id > 0);
        assert_eq!(sub.token.as_ref().unwrap().len(), TOKEN_LENGTH);
    }

    #[tokio::test]
    async fn test_subscribe_rejects_invalid_email() {
        let service = setup().await;
        let result = service.subscribe("not-an-email").await;
        assert!(matches!(
            result,
            Err(SubscriptionServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_duplicate_conflicts() {
        let service = setup().await;
        service.subscribe("reader@example.com").await.unwrap();

        let result = service.subscribe("Reader@example.com").await;
        assert!(matches!(result, Err(SubscriptionServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_ensure_token_is_stable() {
        let service = setup().await;
        let sub = service.subscribe("reader@example.com").await.unwrap();

        let token = service.ensure_token(sub.id).await.unwrap();
        assert_eq!(Some(token.clone()), sub.token);
        assert_eq!(service.ensure_token(sub.id).await.unwrap(), token);
    }

    #[tokio::test]
    async fn test_unsubscribe_by_token() {
        let service = setup().await;
        let sub = service.subscribe("reader@example.com").await.unwrap();

        service.unsubscribe(sub.token.as_ref().unwrap()).await.unwrap();
        assert!(matches!(
            service.get(sub.id).await,
            Err(SubscriptionServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_token_is_not_found() {
        let service = setup().await;
        let result = service.unsubscribe("bogus").await;
        assert!(matches!(result, Err(SubscriptionServiceError::NotFound(_))));
    }
}
