//! Subscription model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the opaque unsubscribe/confirmation token.
pub const TOKEN_LENGTH: usize = 100;

/// Email subscription entity
///
/// The token is an opaque random string generated once and kept for
/// unsubscribe/confirmation flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    pub id: i64,
    /// Subscriber email address
    pub email: String,
    /// Opaque token (generated on demand)
    pub token: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new subscription; the ID is assigned by the database.
    pub fn new(email: String, token: Option<String>) -> Self {
        Self {
            id: 0,
            email,
            token,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_new() {
        let sub = Subscription::new("reader@example.com".to_string(), None);
        assert_eq!(sub.id, 0);
        assert_eq!(sub.email, "reader@example.com");
        assert!(sub.token.is_none());
    }
}
