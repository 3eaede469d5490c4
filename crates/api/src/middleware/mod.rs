//! HTTP middleware for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction tracing) - added in `main.rs`
//! 2. Trailing-slash normalization - see [`crate::service`]
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded into the span)
//!
//! Authentication is not a layer: handlers that need a caller take the
//! [`RequireAuth`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::request_id_middleware;
