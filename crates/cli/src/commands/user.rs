//! User management commands.
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use thiserror::Error;

use recipe_app_api::db::{PgStore, RepositoryError, UserStore};
use recipe_app_api::services::{AccountError, AccountService, NewUserFields};
use recipe_app_core::{Email, EmailError, UserId};

use super::ConnectError;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserCommandError {
    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Account operation failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Lookup failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No user with that email.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

async fn store() -> Result<PgStore, UserCommandError> {
    Ok(PgStore::new(super::connect().await?))
}

/// Create a regular user.
pub async fn create(email: &str, password: &str, name: &str) -> Result<UserId, UserCommandError> {
    let store = store().await?;
    let user = AccountService::new(&store)
        .create_user(email, password, NewUserFields::named(name))
        .await?;

    tracing::info!("User created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(user.id)
}

/// Create a superuser.
pub async fn create_superuser(email: &str, password: &str) -> Result<UserId, UserCommandError> {
    let store = store().await?;
    let user = AccountService::new(&store)
        .create_superuser(email, password)
        .await?;

    tracing::info!("Superuser created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(user.id)
}

/// Issue a new API token for an existing user and return the key.
pub async fn issue_token(email: &str) -> Result<String, UserCommandError> {
    let email = Email::parse(email)?;
    let store = store().await?;

    let user = store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| UserCommandError::UserNotFound(email.to_string()))?;

    let key = AccountService::new(&store).issue_token(&user).await?;
    tracing::warn!("Previous token for {} (if any) has been revoked", user.email);

    Ok(key.as_str().to_owned())
}
