//! Recipe route handlers.
//!
//! All handlers require a token and only ever see the caller's own recipes.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Serialize;

use recipe_app_core::{Price, RecipeId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Recipe;
use crate::services::{RecipeDraft, RecipeService};
use crate::state::AppState;

/// Recipe as shown in listings.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

/// Recipe with every client-visible field.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
}

impl From<Recipe> for RecipeDetail {
    fn from(mut recipe: Recipe) -> Self {
        let description = std::mem::take(&mut recipe.description);
        Self {
            summary: RecipeSummary::from(recipe),
            description,
        }
    }
}

/// A non-numeric id cannot name a recipe.
fn recipe_id(path: std::result::Result<Path<RecipeId>, PathRejection>) -> Result<RecipeId> {
    path.map(|Path(id)| id).map_err(|_| AppError::NotFound)
}

/// `GET /api/recipe/recipes/`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<RecipeSummary>>> {
    let recipes = RecipeService::new(state.store(), user.id).list().await?;
    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

/// `POST /api/recipe/recipes/`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: std::result::Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeDetail>)> {
    let Json(draft) = payload?;
    let recipe = RecipeService::new(state.store(), user.id)
        .create(draft)
        .await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// `GET /api/recipe/recipes/{id}/`
pub async fn retrieve(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    path: std::result::Result<Path<RecipeId>, PathRejection>,
) -> Result<Json<RecipeDetail>> {
    let id = recipe_id(path)?;
    let recipe = RecipeService::new(state.store(), user.id)
        .retrieve(id)
        .await?;
    Ok(Json(recipe.into()))
}

/// `PUT /api/recipe/recipes/{id}/`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    path: std::result::Result<Path<RecipeId>, PathRejection>,
    payload: std::result::Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<Json<RecipeDetail>> {
    let id = recipe_id(path)?;
    let Json(draft) = payload?;
    let recipe = RecipeService::new(state.store(), user.id)
        .update(id, draft)
        .await?;
    Ok(Json(recipe.into()))
}

/// `PATCH /api/recipe/recipes/{id}/`
pub async fn partial_update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    path: std::result::Result<Path<RecipeId>, PathRejection>,
    payload: std::result::Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<Json<RecipeDetail>> {
    let id = recipe_id(path)?;
    let Json(draft) = payload?;
    let recipe = RecipeService::new(state.store(), user.id)
        .partial_update(id, draft)
        .await?;
    Ok(Json(recipe.into()))
}

/// `DELETE /api/recipe/recipes/{id}/`
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    path: std::result::Result<Path<RecipeId>, PathRejection>,
) -> Result<StatusCode> {
    let id = recipe_id(path)?;
    RecipeService::new(state.store(), user.id)
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
