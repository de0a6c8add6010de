//! User model
//!
//! The `User` entity carries the account state: profile fields, the argon2
//! password hash (never serialized), the admin flag, and the active/banned
//! status. Password hashing itself lives in `services::password`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::upload_url;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the user has admin rights
    #[serde(default)]
    pub is_admin: bool,
    /// Account status (active/banned)
    pub status: UserStatus,
    /// Stored avatar filename, if one was uploaded
    #[serde(default)]
    pub avatar: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: the password must already be hashed before calling this.
    /// Use `services::password::hash_password()`.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            email,
            password_hash,
            is_admin: false,
            status: UserStatus::Active,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public URL of the avatar, or the placeholder when none is stored.
    pub fn avatar_url(&self) -> String {
        upload_url(self.avatar.as_deref())
    }

    /// Check if the user is banned
    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }

    /// Check if the user is active
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Active - normal access
    #[default]
    Active,
    /// Banned - cannot log in
    Banned,
}

impl UserStatus {
    /// Map an explicit ban flag onto a status.
    pub fn from_flag(banned: bool) -> Self {
        if banned {
            UserStatus::Banned
        } else {
            UserStatus::Active
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Banned => write!(f, "banned"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "banned" => Ok(UserStatus::Banned),
            _ => Err(anyhow::anyhow!("Invalid user status: {}", s)),
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}

/// Input for a profile update.
///
/// The password is rehashed only when a new non-empty value is supplied;
/// an absent or blank password leaves the stored hash untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    /// New display name
    pub name: String,
    /// New email address
    pub email: String,
    /// New plaintext password (optional)
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "hashed".to_string(),
        );
        assert_eq!(user.id, 0);
        assert!(!user.is_admin);
        assert!(user.is_active());
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_avatar_url_placeholder_when_absent() {
        let user = User::new("A".into(), "a@b.c".into(), "h".into());
        assert_eq!(user.avatar_url(), "/img/no-image.png");
    }

    #[test]
    fn test_avatar_url_uses_stored_filename() {
        let mut user = User::new("A".into(), "a@b.c".into(), "h".into());
        user.avatar = Some("pic.jpg".to_string());
        assert_eq!(user.avatar_url(), "/uploads/pic.jpg");
    }

    #[test]
    fn test_status_from_flag() {
        assert_eq!(UserStatus::from_flag(true), UserStatus::Banned);
        assert_eq!(UserStatus::from_flag(false), UserStatus::Active);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(UserStatus::from_str("active").unwrap(), UserStatus::Active);
        assert_eq!(UserStatus::from_str("BANNED").unwrap(), UserStatus::Banned);
        assert!(UserStatus::from_str("frozen").is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("A".into(), "a@b.c".into(), "secret-hash".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
