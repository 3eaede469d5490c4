//! Integration test harness for the recipe API.
//!
//! Drives the full router (auth extractor, trailing-slash normalization,
//! error mapping) in process against a [`MemoryStore`], so no database or
//! running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p recipe-app-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use recipe_app_api::db::MemoryStore;
use recipe_app_api::models::User;
use recipe_app_api::services::{AccountService, NewUserFields};
use recipe_app_api::state::AppState;

/// Default password for users created by the harness.
pub const PASSWORD: &str = "testpass123";

/// A response with its body decoded as JSON (`Value::Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process application plus direct access to its state.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Fresh app over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let state = AppState::new(MemoryStore::new());
        let router = recipe_app_api::app(state.clone());
        Self { state, router }
    }

    /// Create a user directly through the account service.
    pub async fn create_user(&self, email: &str) -> User {
        AccountService::new(self.state.store())
            .create_user(email, PASSWORD, NewUserFields::default())
            .await
            .unwrap()
    }

    /// Create a user and issue an API token for them.
    pub async fn authenticated_user(&self, email: &str) -> (User, String) {
        let user = self.create_user(email).await;
        let key = AccountService::new(self.state.store())
            .issue_token(&user)
            .await
            .unwrap();
        (user, key.as_str().to_owned())
    }

    /// Send a request, optionally with a token and a JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = recipe_app_api::service(self.router.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    /// `GET` with a token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }
}

/// URL of one recipe's detail endpoint.
#[must_use]
pub fn detail_url(id: &Value) -> String {
    format!("/api/recipe/recipes/{id}/")
}
