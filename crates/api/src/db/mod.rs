//! Persistence for users, recipes and API tokens.
//!
//! # Tables
//!
//! - `app_user` - Accounts (email, password hash, staff/superuser flags)
//! - `recipe` - Recipes, each owned by one `app_user`
//! - `auth_token` - SHA-256 digests of API token keys, one per user
//!
//! # Backends
//!
//! Handlers only see the [`Store`] trait. [`PgStore`] is the production
//! backend; [`MemoryStore`] keeps everything in process for tests and demos.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p recipe-app-cli -- migrate
//! ```

pub mod memory;
pub mod recipes;
pub mod tokens;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use recipe_app_core::{Email, RecipeId, UserId};

use crate::models::{NewUser, Recipe, RecipeChanges, RecipeFields, User};

pub use memory::MemoryStore;
pub use recipes::RecipeRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Convert a sqlx error, turning unique violations into `Conflict`.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Fetch a user by normalized email.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Persist a new name and password hash. Fails with `NotFound` if the user is gone.
    async fn update_user_profile(
        &self,
        id: UserId,
        name: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;
}

/// Owner-scoped recipe persistence.
///
/// Every method takes the owner; a recipe belonging to someone else behaves
/// exactly like a missing one.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// All recipes of `owner`, newest (highest id) first.
    async fn list_recipes(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError>;

    /// One recipe, if it exists and belongs to `owner`.
    async fn get_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RepositoryError>;

    /// Insert a recipe owned by `owner`.
    async fn insert_recipe(
        &self,
        owner: UserId,
        fields: &RecipeFields,
    ) -> Result<Recipe, RepositoryError>;

    /// Apply `changes` to a recipe of `owner`; `None` if there is no such recipe.
    async fn update_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RepositoryError>;

    /// Delete a recipe of `owner`; `false` if there was no such recipe.
    async fn delete_recipe(&self, owner: UserId, id: RecipeId) -> Result<bool, RepositoryError>;
}

/// API token persistence, keyed by digest.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store the digest for `user`, replacing any previous token.
    async fn replace_token(&self, user: UserId, digest: &str) -> Result<(), RepositoryError>;

    /// Resolve a digest to its user.
    async fn get_user_by_token(&self, digest: &str) -> Result<Option<User>, RepositoryError>;
}

/// Everything the HTTP layer needs from a backend.
#[async_trait]
pub trait Store: UserStore + RecipeStore + TokenStore {
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` backend.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
