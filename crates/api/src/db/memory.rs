//! In-process store used by tests and local demos.
//!
//! Mirrors the `PostgreSQL` constraints that handlers rely on: unique
//! emails, one token per user, owner-scoped recipe access and ids that
//! only ever grow.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use recipe_app_core::{Email, RecipeId, UserId};

use super::{RecipeStore, RepositoryError, Store, TokenStore, UserStore};
use crate::models::{NewUser, Recipe, RecipeChanges, RecipeFields, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    recipes: BTreeMap<RecipeId, Recipe>,
    /// Token digest -> owner.
    tokens: HashMap<String, UserId>,
    last_user_id: i32,
    last_recipe_id: i32,
}

/// Store backed by in-memory maps behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.last_user_id),
            email: user.email.clone(),
            name: user.name.clone(),
            password_hash: user.password_hash.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| &u.email == email).cloned())
    }

    async fn update_user_profile(
        &self,
        id: UserId,
        name: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        name.clone_into(&mut user.name);
        password_hash.clone_into(&mut user.password_hash);
        user.updated_at = Utc::now();

        Ok(user.clone())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn list_recipes(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect())
    }

    async fn get_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .get(&id)
            .filter(|r| r.user_id == owner)
            .cloned())
    }

    async fn insert_recipe(
        &self,
        owner: UserId,
        fields: &RecipeFields,
    ) -> Result<Recipe, RepositoryError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&owner) {
            return Err(RepositoryError::NotFound);
        }

        tables.last_recipe_id += 1;
        let now = Utc::now();
        let recipe = Recipe {
            id: RecipeId::new(tables.last_recipe_id),
            user_id: owner,
            title: fields.title.clone(),
            time_minutes: fields.time_minutes,
            price: fields.price,
            description: fields.description.clone(),
            link: fields.link.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.recipes.insert(recipe.id, recipe.clone());

        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(recipe) = tables
            .recipes
            .get_mut(&id)
            .filter(|r| r.user_id == owner)
        else {
            return Ok(None);
        };

        changes.apply_to(recipe);
        recipe.updated_at = Utc::now();

        Ok(Some(recipe.clone()))
    }

    async fn delete_recipe(&self, owner: UserId, id: RecipeId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.recipes.get(&id).is_some_and(|r| r.user_id == owner) {
            tables.recipes.remove(&id);
            return Ok(true);
        }

        Ok(false)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn replace_token(&self, user: UserId, digest: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.tokens.retain(|_, owner| *owner != user);
        tables.tokens.insert(digest.to_owned(), user);
        Ok(())
    }

    async fn get_user_by_token(&self, digest: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .get(digest)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            name: String::new(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    fn fields(title: &str) -> RecipeFields {
        RecipeFields {
            title: title.to_string(),
            time_minutes: 5,
            price: "5.00".parse().unwrap(),
            description: String::new(),
            link: String::new(),
        }
    }

    #[tokio::test]
    async fn test_unique_email() {
        let store = MemoryStore::new();
        store.insert_user(&new_user("a@example.com")).await.unwrap();

        let err = store
            .insert_user(&new_user("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let owner = store.insert_user(&new_user("a@example.com")).await.unwrap().id;

        let first = store.insert_recipe(owner, &fields("one")).await.unwrap();
        assert!(store.delete_recipe(owner, first.id).await.unwrap());
        let second = store.insert_recipe(owner, &fields("two")).await.unwrap();

        assert!(second.id > first.id);
        assert!(!store.delete_recipe(owner, first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_recipe_requires_existing_owner() {
        let store = MemoryStore::new();
        let err = store
            .insert_recipe(UserId::new(99), &fields("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_is_owner_scoped() {
        let store = MemoryStore::new();
        let a = store.insert_user(&new_user("a@example.com")).await.unwrap().id;
        let b = store.insert_user(&new_user("b@example.com")).await.unwrap().id;
        let recipe = store.insert_recipe(a, &fields("mine")).await.unwrap();

        let changes = RecipeChanges {
            title: Some("hijacked".to_string()),
            ..RecipeChanges::default()
        };
        assert!(store.update_recipe(b, recipe.id, &changes).await.unwrap().is_none());
        assert_eq!(
            store.get_recipe(a, recipe.id).await.unwrap().unwrap().title,
            "mine"
        );
    }
}
