//! Input sources for a route.
//!
//! A [`Validator`] is chosen once, when the route is built, and is one of:
//!
//! - **none**: the handler takes no input
//! - **schema**: request data is aggregated and run through a [`Schema`]
//! - **custom**: a function reads the [`RawRequest`] and returns a
//!   [`ParseOutcome`] itself

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use validated_routes_core::{ConfigError, JsonSchema, ParseOutcome, Schema};

use crate::request::RawRequest;

/// Custom extraction function signature.
///
/// Returning `Err` is an unexpected failure (`500` or the error override);
/// returning [`ParseOutcome::Failure`] is a validation failure (`400`).
pub type ExtractFn<T> = dyn Fn(&RawRequest) -> anyhow::Result<ParseOutcome<T>> + Send + Sync;

pub(crate) enum Source<T> {
    Absent(fn() -> T),
    Schema(Arc<dyn Schema<Output = T>>),
    Custom(Arc<ExtractFn<T>>),
}

/// Where a route's input comes from and how it is validated.
pub struct Validator<T> {
    pub(crate) source: Source<T>,
}

impl Validator<()> {
    /// No input: the handler is called with `()`.
    #[must_use]
    pub fn none() -> Self {
        Self {
            source: Source::Absent(|| ()),
        }
    }
}

impl Validator<Value> {
    /// Compile a JSON Schema document into a validator producing raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValidator`] if `document` is not a
    /// valid JSON Schema.
    pub fn json_schema(document: &Value) -> Result<Self, ConfigError> {
        Ok(Self::schema(JsonSchema::<Value>::new(document)?))
    }
}

impl<T> Validator<T> {
    /// Validate aggregated request data with `schema`.
    #[must_use]
    pub fn schema<S>(schema: S) -> Self
    where
        S: Schema<Output = T>,
    {
        Self::shared_schema(Arc::new(schema))
    }

    /// Like [`Validator::schema`], reusing a schema shared between routes.
    #[must_use]
    pub fn shared_schema(schema: Arc<dyn Schema<Output = T>>) -> Self {
        Self {
            source: Source::Schema(schema),
        }
    }

    /// Extract and validate input with a custom function.
    #[must_use]
    pub fn custom<F>(extract: F) -> Self
    where
        F: Fn(&RawRequest) -> anyhow::Result<ParseOutcome<T>> + Send + Sync + 'static,
    {
        Self {
            source: Source::Custom(Arc::new(extract)),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.source {
            Source::Absent(_) => "none",
            Source::Schema(_) => "schema",
            Source::Custom(_) => "custom",
        }
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        let source = match &self.source {
            Source::Absent(unit) => Source::Absent(*unit),
            Source::Schema(schema) => Source::Schema(Arc::clone(schema)),
            Source::Custom(extract) => Source::Custom(Arc::clone(extract)),
        };
        Self { source }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("kind", &self.kind())
            .finish()
    }
}
