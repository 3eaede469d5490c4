//! Domain models for the recipe API.
//!
//! These types represent validated domain objects, separate from the
//! database row types in [`crate::db`] and the JSON shapes in [`crate::routes`].

pub mod recipe;
pub mod token;
pub mod user;

pub use recipe::{Recipe, RecipeChanges, RecipeFields};
pub use token::TokenKey;
pub use user::{NewUser, User};
