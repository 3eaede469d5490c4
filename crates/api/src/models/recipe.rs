//! Recipe domain types.

use core::fmt;

use chrono::{DateTime, Utc};

use recipe_app_core::{Price, RecipeId, UserId};

/// A recipe owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Unique recipe ID; higher means more recently created.
    pub id: RecipeId,
    /// Owning user. Never changes after creation.
    pub user_id: UserId,
    pub title: String,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    pub price: Price,
    pub description: String,
    /// Link to the original recipe, empty when unknown.
    pub link: String,
    /// When the recipe was created.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last updated.
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Every mutable field of a recipe, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub description: String,
    pub link: String,
}

/// A set of field changes; `None` leaves the stored value untouched.
///
/// Has no owner field: ownership is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl RecipeChanges {
    /// Apply the changes to an in-memory recipe.
    pub fn apply_to(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title.clone_from(title);
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(description) = &self.description {
            recipe.description.clone_from(description);
        }
        if let Some(link) = &self.link {
            recipe.link.clone_from(link);
        }
    }
}

impl From<RecipeFields> for RecipeChanges {
    fn from(fields: RecipeFields) -> Self {
        Self {
            title: Some(fields.title),
            time_minutes: Some(fields.time_minutes),
            price: Some(fields.price),
            description: Some(fields.description),
            link: Some(fields.link),
        }
    }
}
