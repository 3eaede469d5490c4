//! Token authentication extractor.
//!
//! Clients authenticate with `Authorization: Token <key>`; the `Bearer`
//! scheme is accepted as well. Any other scheme counts as no credentials.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::{AppError, INVALID_TOKEN, MISSING_CREDENTIALS, set_sentry_user};
use crate::models::{TokenKey, User};
use crate::services::AccountService;
use crate::state::AppState;

/// Extractor that requires an authenticated, active user.
///
/// Rejects with 401 when the header is missing or the token is unknown.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Pull the key out of an `Authorization` header value.
///
/// `Ok(None)` means the header carries some other scheme.
fn parse_token(value: &str) -> Result<Option<TokenKey>, AppError> {
    let mut parts = value.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };

    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(TokenKey::from_client(key))),
        _ => Err(AppError::Unauthorized(INVALID_TOKEN)),
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized(MISSING_CREDENTIALS))?
            .to_str()
            .map_err(|_| AppError::Unauthorized(INVALID_TOKEN))?;

        let key = parse_token(header)?.ok_or(AppError::Unauthorized(MISSING_CREDENTIALS))?;

        let user = AccountService::new(state.store())
            .resolve_token(&key)
            .await?
            .ok_or(AppError::Unauthorized(INVALID_TOKEN))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_schemes() {
        let key = parse_token("Token abc123").unwrap().unwrap();
        assert_eq!(key.as_str(), "abc123");

        let key = parse_token("bearer abc123").unwrap().unwrap();
        assert_eq!(key.as_str(), "abc123");
    }

    #[test]
    fn test_parse_token_other_scheme_is_anonymous() {
        assert!(parse_token("Basic dXNlcjpwYXNz").unwrap().is_none());
        assert!(parse_token("").unwrap().is_none());
    }

    #[test]
    fn test_parse_token_malformed() {
        assert!(parse_token("Token").is_err());
        assert!(parse_token("Token a b").is_err());
    }
}
