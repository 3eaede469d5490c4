//! Account service.
//!
//! Creates users with normalized emails, verifies passwords and manages the
//! single API token each user may hold.

mod error;
pub mod password;

pub use error::AccountError;

use recipe_app_core::Email;

use crate::db::{RepositoryError, TokenStore, UserStore};
use crate::models::{NewUser, TokenKey, User};

/// Optional attributes for [`AccountService::create_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserFields {
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for NewUserFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

impl NewUserFields {
    /// Fields with only a display name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Changes a user may make to their own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Account service.
///
/// Borrows a store for one operation; construct it per request.
pub struct AccountService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> AccountService<'a, S>
where
    S: UserStore + TokenStore + ?Sized,
{
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create a user.
    ///
    /// The email's domain is lowercased before storage; the local part is
    /// kept as given.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` if the email is empty or malformed.
    /// Returns `AccountError::EmptyPassword` if the password is empty.
    /// Returns `AccountError::UserAlreadyExists` if the email is already registered.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        extra: NewUserFields,
    ) -> Result<User, AccountError> {
        let email = Email::parse(email)?;

        if password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        let password_hash = password::hash_password(password)?;

        let new_user = NewUser {
            email,
            name: extra.name,
            password_hash,
            is_active: extra.is_active,
            is_staff: extra.is_staff,
            is_superuser: extra.is_superuser,
        };

        let user = self
            .store
            .insert_user(&new_user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::UserAlreadyExists,
                other => AccountError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Create a user with staff and superuser flags forced on.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_user`].
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let extra = NewUserFields {
            is_staff: true,
            is_superuser: true,
            ..NewUserFields::default()
        };
        self.create_user(email, password, extra).await
    }

    /// Verify an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the email is unknown,
    /// malformed, or the password does not match.
    /// Returns `AccountError::Inactive` if the account is disabled.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = Email::parse(email).map_err(|_| AccountError::InvalidCredentials)?;

        let user = self
            .store
            .get_user_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !user.check_password(password) {
            return Err(AccountError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AccountError::Inactive);
        }

        Ok(user)
    }

    /// Issue a fresh API token for `user`, revoking any previous one.
    ///
    /// The returned key is the only copy; only its digest is stored.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the token cannot be stored.
    pub async fn issue_token(&self, user: &User) -> Result<TokenKey, AccountError> {
        let key = TokenKey::generate();
        self.store.replace_token(user.id, &key.digest()).await?;

        tracing::info!(user_id = %user.id, "api token issued");
        Ok(key)
    }

    /// Resolve a client-supplied token to an active user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the lookup fails.
    pub async fn resolve_token(&self, key: &TokenKey) -> Result<Option<User>, AccountError> {
        let user = self.store.get_user_by_token(&key.digest()).await?;
        Ok(user.filter(|u| u.is_active))
    }

    /// Change a user's name and/or password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyPassword` if an empty password is supplied.
    /// Returns `AccountError::UserNotFound` if the user has been removed.
    pub async fn update_profile(
        &self,
        user: &User,
        update: ProfileUpdate,
    ) -> Result<User, AccountError> {
        let password_hash = match update.password.as_deref() {
            Some("") => return Err(AccountError::EmptyPassword),
            Some(raw) => password::hash_password(raw)?,
            None => user.password_hash.clone(),
        };
        let name = update.name.unwrap_or_else(|| user.name.clone());

        self.store
            .update_user_profile(user.id, &name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AccountError::UserNotFound,
                other => AccountError::Repository(other),
            })
    }
}
