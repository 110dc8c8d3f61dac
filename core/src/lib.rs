//! # Validated Routes Core
//!
//! Framework-agnostic building blocks for validated HTTP routes.
//!
//! A route handler in this architecture never sees raw request data. Input is
//! first gathered into a single JSON object, run through a [`Schema`], and the
//! handler only runs when the schema produced a typed value.
//!
//! ## Core Concepts
//!
//! - **Schema**: Declarative description of expected input with a non-throwing
//!   `safe_parse` operation
//! - **`ParseOutcome`**: Tagged result of parsing, either a value or [`Issues`]
//! - **Issue**: One structured, field-level validation problem
//! - **Aggregation**: Merging path params, body and query into one object
//!
//! ## Example
//!
//! ```
//! use serde::Deserialize;
//! use serde_json::json;
//! use validated_routes_core::{JsonSchema, ParseOutcome, Schema};
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     name: String,
//!     id: String,
//! }
//!
//! let schema = JsonSchema::<User>::new(&json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "id": { "type": "string" }
//!     },
//!     "required": ["name", "id"]
//! }))?;
//!
//! let outcome = schema.safe_parse(&json!({ "name": "John", "id": 123 }));
//! assert!(!outcome.is_success());
//! # Ok::<(), validated_routes_core::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod error;
pub mod issue;
pub mod outcome;
pub mod schema;

// Re-export key types for convenience
pub use aggregate::merge_request_data;
pub use error::ConfigError;
pub use issue::{Issue, IssueCode, Issues, PathSegment};
pub use outcome::ParseOutcome;
pub use schema::{JsonSchema, Schema, TypedSchema};
