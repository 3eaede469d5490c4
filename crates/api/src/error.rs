//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every response body is JSON: either `{"detail": "..."}` or a per-field map
//! such as `{"title": ["This field is required."]}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AccountError, RecipeError};
use crate::validation::FieldErrors;

/// 401 message when no credentials were sent.
pub const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";

/// 401 message when the token does not resolve to an active user.
pub const INVALID_TOKEN: &str = "Invalid token.";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Recipe operation failed.
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// Request fields failed validation.
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// Resource not found (or not visible to the caller).
    #[error("Not found")]
    NotFound,

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// What the client gets to see.
enum Body {
    Detail(String),
    Fields(FieldErrors),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Account(AccountError::Repository(_) | AccountError::PasswordHash)
                | Self::Recipe(RecipeError::Repository(_))
        )
    }

    fn into_parts(self) -> (StatusCode, Body) {
        if self.is_server_error() {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Body::Detail("Internal server error".to_string()),
            );
        }

        match self {
            Self::Account(err) => account_parts(err),
            Self::Recipe(RecipeError::NotFound) | Self::NotFound => {
                (StatusCode::NOT_FOUND, Body::Detail("Not found.".to_string()))
            }
            Self::Recipe(RecipeError::Validation(errors)) | Self::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Body::Fields(errors))
            }
            Self::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Body::Detail(message.to_string()))
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, Body::Detail(message)),
            Self::Recipe(RecipeError::Repository(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Body::Detail("Internal server error".to_string()),
            ),
        }
    }
}

fn account_parts(err: AccountError) -> (StatusCode, Body) {
    let fields = match err {
        AccountError::InvalidEmail(e) => FieldErrors::single("email", e.to_string()),
        AccountError::EmptyPassword => {
            FieldErrors::single("password", crate::validation::BLANK)
        }
        AccountError::UserAlreadyExists => {
            FieldErrors::single("email", "user with this email already exists.")
        }
        AccountError::InvalidCredentials | AccountError::Inactive => FieldErrors::single(
            "non_field_errors",
            "Unable to authenticate with provided credentials.",
        ),
        AccountError::UserNotFound => {
            return (StatusCode::NOT_FOUND, Body::Detail("Not found.".to_string()));
        }
        AccountError::Repository(_) | AccountError::PasswordHash => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Body::Detail("Internal server error".to_string()),
            );
        }
    };
    (StatusCode::BAD_REQUEST, Body::Fields(fields))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = self.into_parts();

        let mut response = match body {
            Body::Detail(detail) => (status, Json(json!({ "detail": detail }))).into_response(),
            Body::Fields(fields) => (status, Json(fields)).into_response(),
        };

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }

        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;
    use http_body_util::BodyExt;
    use recipe_app_core::EmailError;

    async fn parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = parts(AppError::Recipe(RecipeError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Not found." }));
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge() {
        let response = AppError::Unauthorized(MISSING_CREDENTIALS).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Token"
        );
    }

    #[tokio::test]
    async fn test_validation_body_is_field_map() {
        let errors = FieldErrors::single("title", crate::validation::REQUIRED);
        let (status, body) = parts(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "title": ["This field is required."] }));
    }

    #[tokio::test]
    async fn test_account_errors() {
        let (status, body) = parts(AccountError::UserAlreadyExists.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "email": ["user with this email already exists."] })
        );

        let (status, _) = parts(AccountError::InvalidEmail(EmailError::Empty).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = parts(AccountError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("non_field_errors").is_some());
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let secret = RepositoryError::DataCorruption("secret connection string".to_string());
        let (status, body) = parts(RecipeError::Repository(secret).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "Internal server error" }));

        let (status, _) = parts(AccountError::PasswordHash.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
