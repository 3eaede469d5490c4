//! `PostgreSQL` store tests.
//!
//! Each test gets a fresh database with the api migrations applied.
//! Run with: DATABASE_URL=postgres://... cargo test -p recipe-app-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use recipe_app_api::db::{PgStore, RecipeStore, RepositoryError, TokenStore, UserStore};
use recipe_app_api::models::{NewUser, RecipeChanges, RecipeFields, User};
use recipe_app_core::{Email, RecipeId};

async fn user(store: &PgStore, email: &str) -> User {
    store
        .insert_user(&NewUser {
            email: Email::parse(email).unwrap(),
            name: String::new(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        })
        .await
        .unwrap()
}

fn fields(title: &str) -> RecipeFields {
    RecipeFields {
        title: title.to_string(),
        time_minutes: 22,
        price: "5.25".parse().unwrap(),
        description: String::new(),
        link: "http://example.com/recipe.pdf".to_string(),
    }
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_list_is_scoped_and_newest_first(pool: PgPool) {
    let store = PgStore::new(pool);
    let me = user(&store, "me@example.com").await;
    let other = user(&store, "other@example.com").await;

    let first = store.insert_recipe(me.id, &fields("First")).await.unwrap();
    store
        .insert_recipe(other.id, &fields("Theirs"))
        .await
        .unwrap();
    let second = store.insert_recipe(me.id, &fields("Second")).await.unwrap();

    let ids: Vec<RecipeId> = store
        .list_recipes(me.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, [second.id, first.id]);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_other_owner_cannot_touch_recipe(pool: PgPool) {
    let store = PgStore::new(pool);
    let me = user(&store, "me@example.com").await;
    let other = user(&store, "other@example.com").await;
    let theirs = store
        .insert_recipe(other.id, &fields("Theirs"))
        .await
        .unwrap();

    assert!(store.get_recipe(me.id, theirs.id).await.unwrap().is_none());

    let changes = RecipeChanges {
        title: Some("Hijacked".to_string()),
        ..RecipeChanges::default()
    };
    assert!(
        store
            .update_recipe(me.id, theirs.id, &changes)
            .await
            .unwrap()
            .is_none()
    );
    assert!(!store.delete_recipe(me.id, theirs.id).await.unwrap());

    let stored = store.get_recipe(other.id, theirs.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Theirs");
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_partial_update_keeps_unset_columns(pool: PgPool) {
    let store = PgStore::new(pool);
    let me = user(&store, "me@example.com").await;
    let recipe = store.insert_recipe(me.id, &fields("Sample")).await.unwrap();

    let changes = RecipeChanges {
        title: Some("New title".to_string()),
        ..RecipeChanges::default()
    };
    let updated = store
        .update_recipe(me.id, recipe.id, &changes)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "New title");
    assert_eq!(updated.link, recipe.link);
    assert_eq!(updated.price, recipe.price);
    assert_eq!(updated.time_minutes, recipe.time_minutes);
    assert_eq!(updated.user_id, me.id);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_delete_removes_recipe(pool: PgPool) {
    let store = PgStore::new(pool);
    let me = user(&store, "me@example.com").await;
    let recipe = store.insert_recipe(me.id, &fields("Doomed")).await.unwrap();

    assert!(store.delete_recipe(me.id, recipe.id).await.unwrap());
    assert!(store.get_recipe(me.id, recipe.id).await.unwrap().is_none());
    assert!(!store.delete_recipe(me.id, recipe.id).await.unwrap());
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    let existing = user(&store, "me@example.com").await;

    let err = store
        .insert_user(&NewUser {
            email: existing.email.clone(),
            name: String::new(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_replace_token_revokes_previous(pool: PgPool) {
    let store = PgStore::new(pool);
    let me = user(&store, "me@example.com").await;
    let old_digest = "a".repeat(64);
    let new_digest = "b".repeat(64);

    store.replace_token(me.id, &old_digest).await.unwrap();
    store.replace_token(me.id, &new_digest).await.unwrap();

    assert!(store.get_user_by_token(&old_digest).await.unwrap().is_none());
    let resolved = store.get_user_by_token(&new_digest).await.unwrap().unwrap();
    assert_eq!(resolved.id, me.id);
}
