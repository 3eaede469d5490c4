//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (store ping)
//!
//! # Users
//! POST   /api/user/create/            - Register
//! POST   /api/user/token/             - Exchange email/password for an API token
//! GET    /api/user/me/                - Current user (auth)
//! PATCH  /api/user/me/                - Update name/password (auth)
//!
//! # Recipes (auth, owner-scoped)
//! GET    /api/recipe/recipes/         - List, newest first
//! POST   /api/recipe/recipes/         - Create
//! GET    /api/recipe/recipes/{id}/    - Retrieve
//! PUT    /api/recipe/recipes/{id}/    - Replace
//! PATCH  /api/recipe/recipes/{id}/    - Partial update
//! DELETE /api/recipe/recipes/{id}/    - Delete
//! ```
//!
//! Routes are registered without the trailing slash; [`crate::service`]
//! strips it before routing.

pub mod health;
pub mod recipes;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/recipes/{id}",
            get(recipes::retrieve)
                .put(recipes::update)
                .patch(recipes::partial_update)
                .delete(recipes::destroy),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(users::register))
        .route("/token", post(users::token))
        .route("/me", get(users::me).patch(users::update_me))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/recipe", recipe_routes())
        .nest("/api/user", user_routes())
}
