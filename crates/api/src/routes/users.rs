//! User account route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::{AccountService, NewUserFields, ProfileUpdate};
use crate::state::AppState;
use crate::validation::{self, FieldErrors};

/// Shortest password the API accepts.
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Longest display name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email.into_inner(),
            name: user.name,
        }
    }
}

/// Body of `POST /api/user/create/`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Body of `POST /api/user/token/`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/user/token/` responses.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `PATCH /api/user/me/`.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

fn require<'a>(errors: &mut FieldErrors, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value {
        None => {
            errors.add(field, validation::REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, validation::BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }
}

/// `POST /api/user/create/`
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();
    let email = require(&mut errors, "email", request.email.as_deref());
    let password = require(&mut errors, "password", request.password.as_deref());
    if let Some(password) = password {
        check_password(&mut errors, password);
    }
    let name = request.name.unwrap_or_default();
    validation::check_max_length(&mut errors, "name", &name, MAX_NAME_LENGTH);

    let (Some(email), Some(password)) = (email, password) else {
        return Err(errors.into());
    };
    errors.into_result()?;

    let user = AccountService::new(state.store())
        .create_user(email, password, NewUserFields::named(name))
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /api/user/token/`
pub async fn token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();
    let email = require(&mut errors, "email", request.email.as_deref());
    let password = require(&mut errors, "password", request.password.as_deref());
    let (Some(email), Some(password)) = (email, password) else {
        return Err(errors.into());
    };

    let accounts = AccountService::new(state.store());
    let user = accounts.authenticate(email, password).await?;
    let key = accounts.issue_token(&user).await?;

    Ok(Json(TokenResponse {
        token: key.as_str().to_owned(),
    }))
}

/// `GET /api/user/me/`
pub async fn me(RequireAuth(user): RequireAuth) -> Json<UserResponse> {
    Json(user.into())
}

/// `PATCH /api/user/me/`
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: std::result::Result<Json<UpdateMeRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();
    if let Some(name) = &request.name {
        validation::check_max_length(&mut errors, "name", name, MAX_NAME_LENGTH);
    }
    if let Some(password) = &request.password {
        check_password(&mut errors, password);
    }
    errors.into_result()?;

    let update = ProfileUpdate {
        name: request.name,
        password: request.password,
    };
    let updated = AccountService::new(state.store())
        .update_profile(&user, update)
        .await?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        let mut errors = FieldErrors::new();

        assert_eq!(require(&mut errors, "a", Some("x")), Some("x"));
        assert_eq!(require(&mut errors, "b", None), None);
        assert_eq!(require(&mut errors, "c", Some("  ")), None);

        assert!(errors.get("a").is_none());
        assert_eq!(errors.get("b").unwrap(), [validation::REQUIRED]);
        assert_eq!(errors.get("c").unwrap(), [validation::BLANK]);
    }

    #[test]
    fn test_short_password() {
        let mut errors = FieldErrors::new();
        check_password(&mut errors, "pw");
        assert!(errors.get("password").is_some());

        let mut errors = FieldErrors::new();
        check_password(&mut errors, "pw123");
        assert!(errors.is_empty());
    }
}
