//! User model
//!
//! A user is the owner of comments and notes. The two roles that matter
//! for access control (author and reader) are not stored: a user is the
//! author of whatever rows reference their id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Password hash marker for accounts that cannot log in with a password.
///
/// Such accounts are only reachable through a session created directly,
/// the way fixtures log users in.
pub const UNUSABLE_PASSWORD: &str = "!";

/// User entity representing a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2 PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User.
    ///
    /// The password must already be hashed, see `services::password::hash_password()`.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Create a user that has no usable password
    pub fn without_password(username: impl Into<String>) -> Self {
        Self::new(username.into(), UNUSABLE_PASSWORD.to_string())
    }

    /// Whether password login is possible for this account
    pub fn has_usable_password(&self) -> bool {
        self.password_hash.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("testuser".to_string(), "$argon2id$hash".to_string());

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "testuser");
        assert!(user.has_usable_password());
    }

    #[test]
    fn test_user_without_password() {
        let user = User::without_password("Лев Толстой");

        assert_eq!(user.username, "Лев Толстой");
        assert_eq!(user.password_hash, UNUSABLE_PASSWORD);
        assert!(!user.has_usable_password());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("reader".to_string(), "$argon2id$secret".to_string());
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "reader");
    }
}
