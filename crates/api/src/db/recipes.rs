//! Recipe repository for database operations.
//!
//! Every statement carries `user_id = $owner` in its `WHERE` clause, so
//! ownership is checked in the same statement that reads or writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use recipe_app_core::{Price, RecipeId, UserId};

use super::{PgStore, RecipeStore, RepositoryError};
use crate::models::{Recipe, RecipeChanges, RecipeFields};

const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, description, link, \
                              created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i32,
    user_id: i32,
    title: String,
    time_minutes: i32,
    price: Decimal,
    description: String,
    link: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = RepositoryError;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: RecipeId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            time_minutes: row.time_minutes,
            price,
            description: row.description,
            link: row.link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for recipe database operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the owner's recipes, highest id first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError> {
        let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Recipe::try_from).collect()
    }

    /// Get one of the owner's recipes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, owner: UserId, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        row.map(Recipe::try_from).transpose()
    }

    /// Insert a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: UserId,
        fields: &RecipeFields,
    ) -> Result<Recipe, RepositoryError> {
        let row: RecipeRow = sqlx::query_as(&format!(
            r"
            INSERT INTO recipe (user_id, title, time_minutes, price, description, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(&fields.title)
        .bind(fields.time_minutes)
        .bind(fields.price)
        .bind(&fields.description)
        .bind(&fields.link)
        .fetch_one(self.pool)
        .await?;

        Recipe::try_from(row)
    }

    /// Apply field changes; absent fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        owner: UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!(
            r"
            UPDATE recipe
            SET title = COALESCE($3, title),
                time_minutes = COALESCE($4, time_minutes),
                price = COALESCE($5, price),
                description = COALESCE($6, description),
                link = COALESCE($7, link),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(owner)
        .bind(changes.title.as_deref())
        .bind(changes.time_minutes)
        .bind(changes.price)
        .bind(changes.description.as_deref())
        .bind(changes.link.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(Recipe::try_from).transpose()
    }

    /// Delete one of the owner's recipes.
    ///
    /// # Returns
    ///
    /// Returns `true` if the recipe was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, owner: UserId, id: RecipeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM recipe WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn list_recipes(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError> {
        RecipeRepository::new(self.pool()).list_for_owner(owner).await
    }

    async fn get_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RepositoryError> {
        RecipeRepository::new(self.pool()).get(owner, id).await
    }

    async fn insert_recipe(
        &self,
        owner: UserId,
        fields: &RecipeFields,
    ) -> Result<Recipe, RepositoryError> {
        RecipeRepository::new(self.pool()).create(owner, fields).await
    }

    async fn update_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RepositoryError> {
        RecipeRepository::new(self.pool())
            .update(owner, id, changes)
            .await
    }

    async fn delete_recipe(&self, owner: UserId, id: RecipeId) -> Result<bool, RepositoryError> {
        RecipeRepository::new(self.pool()).delete(owner, id).await
    }
}
