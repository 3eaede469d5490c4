//! API token repository.

use async_trait::async_trait;
use sqlx::PgPool;

use recipe_app_core::UserId;

use super::users::UserRow;
use super::{PgStore, RepositoryError, TokenStore};
use crate::models::User;

/// Repository for `auth_token` rows.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a digest for `user`, overwriting the previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn replace(&self, user: UserId, digest: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO auth_token (user_id, digest)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET digest = EXCLUDED.digest, created_at = NOW()
            ",
        )
        .bind(user)
        .bind(digest)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "token"))?;

        Ok(())
    }

    /// Find the user holding `digest`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_user(&self, digest: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.name, u.password_hash, u.is_active, u.is_staff,
                   u.is_superuser, u.created_at, u.updated_at
            FROM auth_token t
            JOIN app_user u ON u.id = t.user_id
            WHERE t.digest = $1
            ",
        )
        .bind(digest)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn replace_token(&self, user: UserId, digest: &str) -> Result<(), RepositoryError> {
        TokenRepository::new(self.pool()).replace(user, digest).await
    }

    async fn get_user_by_token(&self, digest: &str) -> Result<Option<User>, RepositoryError> {
        TokenRepository::new(self.pool()).get_user(digest).await
    }
}
