//! Axum integration for validated routes.
//!
//! This crate turns a plain async business function into an Axum handler
//! that parses its input first. The business function never sees raw HTTP:
//! it receives a typed value or is not called at all.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Request Adapter (Axum)           │  ← body, path params, query
//! │  - Aggregate request data               │  ← validation → 400
//! │  - Catch errors and panics              │  ← override → 500 fallback
//! ├─────────────────────────────────────────┤
//! │        Business Handler                 │
//! │  - Typed input, typed output            │  ← no HTTP types
//! │  - Returns Result<O, E>                 │  ← testable without a server
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at the [`RouteAdapter`]
//! 2. **Extract input** per the [`Validator`] variant (none, schema, custom)
//! 3. **Validation failure** → `400 { "routeParsingError": [...] }`
//! 4. **Call handler** with the parsed value
//! 5. **Success** → `200` with the output as JSON
//! 6. **Unexpected failure** → [`ErrorOverride`], else `500`
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::post, Router};
//! use validated_routes_core::JsonSchema;
//! use validated_routes_web::{parsing_middleware, AdapterOptions, Validator};
//!
//! async fn create_user(user: User) -> anyhow::Result<Profile> {
//!     Ok(Profile { age: 30 })
//! }
//!
//! let schema = JsonSchema::<User>::new(&user_schema_document)?;
//! let app = Router::new().route(
//!     "/users",
//!     post(parsing_middleware(create_user, Validator::schema(schema), AdapterOptions::default())),
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod error_override;
pub mod request;
pub mod validator;

// Re-export key types for convenience
pub use adapter::{
    no_input, parsing_middleware, AdapterMarker, AdapterOptions, RouteAdapter,
    DEFAULT_BODY_LIMIT, RESPONSES_METRIC,
};
pub use config::{
    configure, current, factory, reset, ConfigSource, Configuration, GlobalConfig, RouteFactory,
};
pub use error::{UnexpectedError, ValidationFailure, VALIDATION_ERROR_FIELD};
pub use error_override::ErrorOverride;
pub use request::{RawRequest, RequestContext, CORRELATION_ID_HEADER};
pub use validator::{ExtractFn, Validator};
