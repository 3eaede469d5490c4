//! Recipe service.
//!
//! Every operation is scoped to one owner. A recipe that belongs to someone
//! else is reported as [`RecipeError::NotFound`], never as forbidden.

use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

use recipe_app_core::{Price, PriceError, RecipeId, UserId};

use crate::db::{RecipeStore, RepositoryError};
use crate::models::{Recipe, RecipeChanges, RecipeFields};
use crate::validation::{self, FieldErrors};

/// Maximum length of `title` and `link`.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Errors that can occur during recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// No recipe with that id belongs to the caller.
    #[error("recipe not found")]
    NotFound,

    /// One or more fields failed validation.
    #[error("invalid recipe: {0}")]
    Validation(FieldErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<FieldErrors> for RecipeError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// A price as sent by a client.
///
/// Both `"5.25"` and `5.25` are accepted; anything else is kept so it can be
/// reported against the `price` field instead of failing the whole body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
    Other(IgnoredAny),
}

impl PriceInput {
    fn parse(&self) -> Result<Price, PriceError> {
        match self {
            Self::Text(text) => text.parse(),
            Self::Number(number) => number.to_string().parse(),
            Self::Other(_) => Err(PriceError::Invalid),
        }
    }
}

impl From<&str> for PriceInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Unvalidated recipe input as received from a client.
///
/// Unknown keys such as `user` are ignored, so a payload cannot move a
/// recipe to another owner. Text fields are trimmed before they are checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<PriceInput>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl RecipeDraft {
    /// Validate a complete recipe; `title`, `time_minutes` and `price` are required.
    ///
    /// Missing `description` and `link` become empty strings.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn into_fields(self) -> Result<RecipeFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.title.is_none() {
            errors.add("title", validation::REQUIRED);
        }
        if self.time_minutes.is_none() {
            errors.add("time_minutes", validation::REQUIRED);
        }
        if self.price.is_none() {
            errors.add("price", validation::REQUIRED);
        }

        let changes = self.into_changes_collecting(&mut errors);
        let (Some(title), Some(time_minutes), Some(price)) =
            (changes.title, changes.time_minutes, changes.price)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(RecipeFields {
            title,
            time_minutes,
            price,
            description: changes.description.unwrap_or_default(),
            link: changes.link.unwrap_or_default(),
        })
    }

    /// Validate only the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn into_changes(self) -> Result<RecipeChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = self.into_changes_collecting(&mut errors);
        errors.into_result().map(|()| changes)
    }

    fn into_changes_collecting(self, errors: &mut FieldErrors) -> RecipeChanges {
        let title = self.title.map(|title| title.trim().to_owned()).filter(|title| {
            if title.is_empty() {
                errors.add("title", validation::BLANK);
                return false;
            }
            validation::check_max_length(errors, "title", title, MAX_TEXT_LENGTH);
            true
        });

        let time_minutes = match self.time_minutes {
            None => None,
            Some(minutes) if minutes < 0 => {
                errors.add(
                    "time_minutes",
                    "Ensure this value is greater than or equal to 0.",
                );
                None
            }
            Some(minutes) => i32::try_from(minutes).ok().or_else(|| {
                errors.add(
                    "time_minutes",
                    format!("Ensure this value is less than or equal to {}.", i32::MAX),
                );
                None
            }),
        };

        let price = self.price.and_then(|input| match input.parse() {
            Ok(price) => Some(price),
            Err(e) => {
                errors.add("price", e.to_string());
                None
            }
        });

        let link = self.link.map(|link| link.trim().to_owned());
        if let Some(link) = &link {
            validation::check_max_length(errors, "link", link, MAX_TEXT_LENGTH);
        }

        RecipeChanges {
            title,
            time_minutes,
            price,
            description: self.description.map(|text| text.trim().to_owned()),
            link,
        }
    }
}

/// Recipe operations on behalf of one owner.
pub struct RecipeService<'a, S: ?Sized> {
    store: &'a S,
    owner: UserId,
}

impl<'a, S> RecipeService<'a, S>
where
    S: RecipeStore + ?Sized,
{
    /// Create a recipe service acting for `owner`.
    #[must_use]
    pub const fn new(store: &'a S, owner: UserId) -> Self {
        Self { store, owner }
    }

    /// All of the owner's recipes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.store.list_recipes(self.owner).await?)
    }

    /// A single recipe.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if it does not exist or is not the owner's.
    pub async fn retrieve(&self, id: RecipeId) -> Result<Recipe, RecipeError> {
        self.store
            .get_recipe(self.owner, id)
            .await?
            .ok_or(RecipeError::NotFound)
    }

    /// Create a recipe owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` if required fields are missing or invalid.
    pub async fn create(&self, draft: RecipeDraft) -> Result<Recipe, RecipeError> {
        let fields = draft.into_fields()?;
        let recipe = self.store.insert_recipe(self.owner, &fields).await?;

        tracing::info!(recipe_id = %recipe.id, user_id = %self.owner, "recipe created");
        Ok(recipe)
    }

    /// Change only the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` if a supplied field is invalid.
    /// Returns `RecipeError::NotFound` if it does not exist or is not the owner's.
    pub async fn partial_update(
        &self,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, RecipeError> {
        let changes = draft.into_changes()?;
        self.apply(id, &changes).await
    }

    /// Replace every mutable field; omitted optional fields are cleared.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` if required fields are missing or invalid.
    /// Returns `RecipeError::NotFound` if it does not exist or is not the owner's.
    pub async fn update(&self, id: RecipeId, draft: RecipeDraft) -> Result<Recipe, RecipeError> {
        let changes = RecipeChanges::from(draft.into_fields()?);
        self.apply(id, &changes).await
    }

    /// Delete a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if it does not exist or is not the owner's.
    pub async fn delete(&self, id: RecipeId) -> Result<(), RecipeError> {
        if !self.store.delete_recipe(self.owner, id).await? {
            return Err(RecipeError::NotFound);
        }

        tracing::info!(recipe_id = %id, user_id = %self.owner, "recipe deleted");
        Ok(())
    }

    async fn apply(&self, id: RecipeId, changes: &RecipeChanges) -> Result<Recipe, RecipeError> {
        self.store
            .update_recipe(self.owner, id, changes)
            .await?
            .ok_or(RecipeError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, UserStore};
    use crate::models::NewUser;
    use recipe_app_core::Email;

    async fn user(store: &MemoryStore, email: &str) -> UserId {
        store
            .insert_user(&NewUser {
                email: Email::parse(email).unwrap(),
                name: String::new(),
                password_hash: String::new(),
                is_active: true,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap()
            .id
    }

    fn draft(title: &str) -> RecipeDraft {
        RecipeDraft {
            title: Some(title.to_string()),
            time_minutes: Some(22),
            price: Some("5.25".into()),
            description: None,
            link: Some("http://example.com/recipe.pdf".to_string()),
        }
    }

    #[test]
    fn test_into_fields_requires_core_fields() {
        let errors = RecipeDraft::default().into_fields().unwrap_err();

        assert_eq!(errors.get("title").unwrap(), [validation::REQUIRED]);
        assert_eq!(errors.get("time_minutes").unwrap(), [validation::REQUIRED]);
        assert_eq!(errors.get("price").unwrap(), [validation::REQUIRED]);
        assert!(errors.get("link").is_none());
    }

    #[test]
    fn test_into_fields_defaults_optional_text() {
        let fields = RecipeDraft {
            link: None,
            ..draft("Soup")
        }
        .into_fields()
        .unwrap();

        assert_eq!(fields.description, "");
        assert_eq!(fields.link, "");
        assert_eq!(fields.price.to_string(), "5.25");
    }

    #[test]
    fn test_invalid_values_are_reported_per_field() {
        let errors = RecipeDraft {
            title: Some("   ".to_string()),
            time_minutes: Some(-1),
            price: Some("1000".into()),
            description: None,
            link: Some("x".repeat(256)),
        }
        .into_changes()
        .unwrap_err();

        assert_eq!(errors.get("title").unwrap(), [validation::BLANK]);
        assert!(errors.get("time_minutes").is_some());
        assert!(errors.get("price").is_some());
        assert!(errors.get("link").is_some());
    }

    #[test]
    fn test_price_accepts_string_and_number() {
        let draft: RecipeDraft =
            serde_json::from_value(serde_json::json!({ "price": 5.5 })).unwrap();
        let changes = draft.into_changes().unwrap();
        assert_eq!(changes.price.unwrap().to_string(), "5.50");

        let draft: RecipeDraft =
            serde_json::from_value(serde_json::json!({ "price": " 7 " })).unwrap();
        let changes = draft.into_changes().unwrap();
        assert_eq!(changes.price.unwrap().to_string(), "7.00");
    }

    #[test]
    fn test_unparseable_price_is_a_field_error() {
        let inputs = [
            serde_json::json!("abc"),
            serde_json::json!(true),
            serde_json::json!([1]),
        ];
        for price in inputs {
            let draft: RecipeDraft =
                serde_json::from_value(serde_json::json!({ "price": price })).unwrap();
            let errors = draft.into_changes().unwrap_err();
            assert_eq!(errors.get("price").unwrap(), ["A valid number is required."]);
        }
    }

    #[test]
    fn test_text_fields_are_trimmed() {
        let changes = RecipeDraft {
            title: Some("  Padded  ".to_string()),
            description: Some(" Stir. ".to_string()),
            link: Some(" http://example.com/x ".to_string()),
            ..RecipeDraft::default()
        }
        .into_changes()
        .unwrap();

        assert_eq!(changes.title.as_deref(), Some("Padded"));
        assert_eq!(changes.description.as_deref(), Some("Stir."));
        assert_eq!(changes.link.as_deref(), Some("http://example.com/x"));
    }

    #[test]
    fn test_time_minutes_out_of_range() {
        let errors = RecipeDraft {
            time_minutes: Some(i64::from(i32::MAX) + 1),
            ..RecipeDraft::default()
        }
        .into_changes()
        .unwrap_err();

        assert!(errors.get("time_minutes").is_some());
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let me = user(&store, "me@example.com").await;
        let other = user(&store, "other@example.com").await;

        let mine = RecipeService::new(&store, me);
        mine.create(draft("First")).await.unwrap();
        mine.create(draft("Second")).await.unwrap();
        RecipeService::new(&store, other)
            .create(draft("Theirs"))
            .await
            .unwrap();

        let titles: Vec<String> = mine
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["Second", "First"]);
    }

    #[tokio::test]
    async fn test_other_owner_is_not_found() {
        let store = MemoryStore::new();
        let me = user(&store, "me@example.com").await;
        let other = user(&store, "other@example.com").await;
        let recipe = RecipeService::new(&store, other)
            .create(draft("Theirs"))
            .await
            .unwrap();

        let mine = RecipeService::new(&store, me);
        assert!(matches!(mine.retrieve(recipe.id).await, Err(RecipeError::NotFound)));
        assert!(matches!(
            mine.partial_update(recipe.id, draft("Stolen")).await,
            Err(RecipeError::NotFound)
        ));
        assert!(matches!(mine.delete(recipe.id).await, Err(RecipeError::NotFound)));

        let still_there = RecipeService::new(&store, other)
            .retrieve(recipe.id)
            .await
            .unwrap();
        assert_eq!(still_there.title, "Theirs");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        let me = user(&store, "me@example.com").await;
        let service = RecipeService::new(&store, me);
        let recipe = service.create(draft("Sample recipe title")).await.unwrap();

        let patch = RecipeDraft {
            title: Some("New recipe title".to_string()),
            ..RecipeDraft::default()
        };
        let updated = service.partial_update(recipe.id, patch).await.unwrap();

        assert_eq!(updated.title, "New recipe title");
        assert_eq!(updated.link, recipe.link);
        assert_eq!(updated.user_id, me);
    }

    #[tokio::test]
    async fn test_full_update_clears_optional_fields() {
        let store = MemoryStore::new();
        let me = user(&store, "me@example.com").await;
        let service = RecipeService::new(&store, me);
        let recipe = service.create(draft("Sample")).await.unwrap();

        let put = RecipeDraft {
            title: Some("New recipe title".to_string()),
            time_minutes: Some(10),
            price: Some("2.50".into()),
            description: Some("New recipe description".to_string()),
            link: None,
        };
        let updated = service.update(recipe.id, put).await.unwrap();

        assert_eq!(updated.time_minutes, 10);
        assert_eq!(updated.description, "New recipe description");
        assert_eq!(updated.link, "");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let me = user(&store, "me@example.com").await;
        let service = RecipeService::new(&store, me);
        let recipe = service.create(draft("Doomed")).await.unwrap();

        service.delete(recipe.id).await.unwrap();

        assert!(matches!(service.retrieve(recipe.id).await, Err(RecipeError::NotFound)));
    }
}
