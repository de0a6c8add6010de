//! User service
//!
//! Account management plus the cookie-session login flow. Profile edits
//! rehash the password only when a new non-empty one is supplied; banned
//! accounts keep their data but cannot log in.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, UpdateProfileInput, User, UserStatus};
use crate::services::password::{hash_password, verify_password};

/// How long a login session stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Email already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Wrong email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is banned
    #[error("Account is banned")]
    Banned,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Register a new account.
    pub async fn create(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(UserServiceError::ValidationError(format!(
                "Invalid email address: {}",
                email
            )));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        if self
            .users
            .email_taken(&email, None)
            .await
            .context("Failed to check email")?
        {
            return Err(UserServiceError::Conflict(format!(
                "Email already in use: {}",
                email
            )));
        }

        let password_hash = hash_password(&input.password)?;
        self.users
            .create(&User::new(name.to_string(), email, password_hash))
            .await
            .context("Failed to create user")
            .map_err(Into::into)
    }

    /// Update the profile of an existing user.
    ///
    /// The password hash is rewritten only when a new non-empty password is
    /// supplied; otherwise the stored hash stays as-is.
    pub async fn update_profile(
        &self,
        id: i64,
        input: UpdateProfileInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get(id).await?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(UserServiceError::ValidationError(format!(
                "Invalid email address: {}",
                email
            )));
        }

        if self
            .users
            .email_taken(&email, Some(id))
            .await
            .context("Failed to check email")?
        {
            return Err(UserServiceError::Conflict(format!(
                "Email already in use: {}",
                email
            )));
        }

        user.name = name.to_string();
        user.email = email;
        if let Some(password) = input.password {
            if !password.is_empty() {
                user.password_hash = hash_password(&password)?;
            }
        }

        self.users
            .update(&user)
            .await
            .context("Failed to update user")?;
        Ok(user)
    }

    /// Record (or clear) the avatar filename, returning the previous one so
    /// the caller can delete the file.
    pub async fn set_avatar(
        &self,
        id: i64,
        avatar: Option<String>,
    ) -> Result<Option<String>, UserServiceError> {
        let mut user = self.get(id).await?;
        let previous = user.avatar.take();
        user.avatar = avatar;
        self.users
            .update(&user)
            .await
            .context("Failed to set avatar")?;
        Ok(previous)
    }

    /// Set the admin flag: `true` grants admin rights, `false` revokes them.
    pub async fn set_admin(&self, id: i64, admin: bool) -> Result<(), UserServiceError> {
        self.get(id).await?;
        self.users
            .set_admin(id, admin)
            .await
            .context("Failed to set admin flag")
            .map_err(Into::into)
    }

    /// Set the ban flag: `true` bans the account, `false` restores it.
    pub async fn set_banned(&self, id: i64, banned: bool) -> Result<(), UserServiceError> {
        self.get(id).await?;
        self.users
            .set_status(id, UserStatus::from_flag(banned))
            .await
            .context("Failed to set user status")
            .map_err(Into::into)
    }

    /// Get user by ID
    pub async fn get(&self, id: i64) -> Result<User, UserServiceError> {
        self.users
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| UserServiceError::NotFound(format!("User with ID {} not found", id)))
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, UserServiceError> {
        self.users
            .list()
            .await
            .context("Failed to list users")
            .map_err(Into::into)
    }

    /// Delete a user account
    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        let user = self.get(id).await?;
        self.users
            .delete(user.id)
            .await
            .context("Failed to delete user")?;
        Ok(())
    }

    /// Log in with email and password, creating a session.
    ///
    /// Wrong email and wrong password produce the same error, so the
    /// response does not reveal which accounts exist.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .get_by_email(&email)
            .await
            .context("Failed to look up user")?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::InvalidCredentials);
        }
        if user.is_banned() {
            return Err(UserServiceError::Banned);
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        };
        self.sessions
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are removed on sight. Sessions of banned users are
    /// rejected without deleting them.
    pub async fn validate_session(&self, session_id: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .sessions
            .get_by_id(session_id)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.sessions
                .delete(session_id)
                .await
                .context("Failed to drop expired session")?;
            return Ok(None);
        }

        let user = self
            .users
            .get_by_id(session.user_id)
            .await
            .context("Failed to get session user")?;

        Ok(user.filter(|u| !u.is_banned()))
    }

    /// Log out by deleting the session.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.sessions
            .delete(session_id)
            .await
            .context("Failed to delete session")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::create_test_pool;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to migrate");
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn input(email: &str) -> CreateUserInput {
        CreateUserInput {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "hunter2!".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();
        assert!(user.id > 0);
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "hunter2!");
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let service = setup().await;
        service.create(input("ada@example.com")).await.unwrap();

        let result = service.create(input("ADA@example.com")).await;
        assert!(matches!(result, Err(UserServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let service = setup().await;
        service.create(input("ada@example.com")).await.unwrap();

        let (user, session) = service.login("ada@example.com", "hunter2!").await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(!session.is_expired());

        let resolved = service.validate_session(&session.id).await.unwrap();
        assert_eq!(resolved.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let service = setup().await;
        service.create(input("ada@example.com")).await.unwrap();

        let result = service.login("ada@example.com", "wrong").await;
        assert!(matches!(result, Err(UserServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_fails() {
        let service = setup().await;
        let result = service.login("nobody@example.com", "hunter2!").await;
        assert!(matches!(result, Err(UserServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_banned_user_cannot_login() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();
        service.set_banned(user.id, true).await.unwrap();

        let result = service.login("ada@example.com", "hunter2!").await;
        assert!(matches!(result, Err(UserServiceError::Banned)));
    }

    #[tokio::test]
    async fn test_unban_restores_login() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();
        service.set_banned(user.id, true).await.unwrap();
        service.set_banned(user.id, false).await.unwrap();

        assert!(service.login("ada@example.com", "hunter2!").await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup().await;
        service.create(input("ada@example.com")).await.unwrap();

        let (_, session) = service.login("ada@example.com", "hunter2!").await.unwrap();
        service.logout(&session.id).await.unwrap();

        let resolved = service.validate_session(&session.id).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_profile_update_without_password_keeps_hash() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();

        let updated = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    password: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_profile_update_empty_password_keeps_hash() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();

        let updated = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    password: Some(String::new()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_profile_update_new_password_rehashes() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();

        let updated = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    password: Some("new-secret".to_string()),
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.password_hash, user.password_hash);
        assert!(service.login("ada@example.com", "new-secret").await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_update_taken_email_conflicts() {
        let service = setup().await;
        service.create(input("first@example.com")).await.unwrap();
        let second = service.create(input("second@example.com")).await.unwrap();

        let result = service
            .update_profile(
                second.id,
                UpdateProfileInput {
                    name: "Ada".to_string(),
                    email: "first@example.com".to_string(),
                    password: None,
                },
            )
            .await;
        assert!(matches!(result, Err(UserServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_set_avatar_returns_previous() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();

        let old = service
            .set_avatar(user.id, Some("a.png".to_string()))
            .await
            .unwrap();
        assert!(old.is_none());

        let old = service
            .set_avatar(user.id, Some("b.png".to_string()))
            .await
            .unwrap();
        assert_eq!(old.as_deref(), Some("a.png"));
    }

    #[tokio::test]
    async fn test_admin_toggle() {
        let service = setup().await;
        let user = service.create(input("ada@example.com")).await.unwrap();
        assert!(!service.get(user.id).await.unwrap().is_admin);

        service.set_admin(user.id, true).await.unwrap();
        assert!(service.get(user.id).await.unwrap().is_admin);

        service.set_admin(user.id, false).await.unwrap();
        assert!(!service.get(user.id).await.unwrap().is_admin);
    }
}
