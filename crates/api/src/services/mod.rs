//! Business logic services for the recipe API.
//!
//! # Services
//!
//! - `accounts` - User creation, password verification, API tokens
//! - `recipes` - Owner-scoped recipe CRUD with field validation
//!
//! Services borrow a store for the duration of one request and are generic
//! over the store traits in [`crate::db`], so the same code runs against
//! `PostgreSQL` and the in-memory backend.

pub mod accounts;
pub mod recipes;

pub use accounts::{AccountError, AccountService, NewUserFields, ProfileUpdate};
pub use recipes::{PriceInput, RecipeDraft, RecipeError, RecipeService};
