//! User domain types.

use chrono::{DateTime, Utc};

use recipe_app_core::{Email, UserId};

use crate::services::accounts::password;

/// An API user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address, used as the login name.
    pub email: Email,
    /// Optional display name.
    pub name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Inactive users cannot authenticate.
    pub is_active: bool,
    /// May access staff tooling.
    pub is_staff: bool,
    /// Has every permission.
    pub is_superuser: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Verify a raw password against the stored hash.
    #[must_use]
    pub fn check_password(&self, raw: &str) -> bool {
        password::verify_password(raw, &self.password_hash)
    }
}

/// Values needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}
