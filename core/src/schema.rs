//! Schemas: declarative input descriptions with a non-throwing parse.
//!
//! Two stock implementations are provided:
//!
//! - [`JsonSchema`]: a compiled JSON Schema document, reporting every
//!   violation with its location, followed by typed deserialization
//! - [`TypedSchema`]: plain `serde` deserialization into `T`
//!
//! Applications with bespoke rules implement [`Schema`] directly.

use crate::error::ConfigError;
use crate::issue::{Issue, Issues};
use crate::outcome::ParseOutcome;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A declarative description of expected input.
///
/// `safe_parse` must never panic: every problem with the input is reported
/// as [`ParseOutcome::Failure`].
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use validated_routes_core::{Issue, ParseOutcome, Schema};
///
/// struct NonEmptyName;
///
/// impl Schema for NonEmptyName {
///     type Output = String;
///
///     fn safe_parse(&self, input: &Value) -> ParseOutcome<String> {
///         match input.get("name").and_then(Value::as_str) {
///             Some(name) if !name.is_empty() => ParseOutcome::Success(name.to_string()),
///             _ => ParseOutcome::failure(Issue::custom("name is required").at("name")),
///         }
///     }
/// }
/// ```
pub trait Schema: Send + Sync + 'static {
    /// The typed value produced by a successful parse.
    type Output;

    /// Parse and validate `input` without failing.
    fn safe_parse(&self, input: &Value) -> ParseOutcome<Self::Output>;
}

/// Deserialize an already-validated value into `T`.
fn deserialize<T: DeserializeOwned>(input: &Value) -> ParseOutcome<T> {
    match <T as serde::Deserialize>::deserialize(input) {
        Ok(value) => ParseOutcome::Success(value),
        Err(err) => ParseOutcome::failure(Issue::from_serde_error(&err)),
    }
}

/// Schema backed by a JSON Schema document.
///
/// The document is compiled once at construction. Parsing first collects
/// every schema violation; only input that passes is deserialized into `T`.
///
/// Use `JsonSchema<serde_json::Value>` to validate without a target type.
pub struct JsonSchema<T> {
    validator: jsonschema::Validator,
    _output: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T>
where
    T: DeserializeOwned + 'static,
{
    /// Compile a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValidator`] if `document` is not a valid
    /// JSON Schema.
    pub fn new(document: &Value) -> Result<Self, ConfigError> {
        let validator = jsonschema::validator_for(document)
            .map_err(|err| ConfigError::invalid_validator(err.to_string()))?;

        Ok(Self {
            validator,
            _output: PhantomData,
        })
    }
}

impl<T> Schema for JsonSchema<T>
where
    T: DeserializeOwned + 'static,
{
    type Output = T;

    fn safe_parse(&self, input: &Value) -> ParseOutcome<T> {
        let issues = self
            .validator
            .iter_errors(input)
            .map(|err| Issue::from_validation_error(&err))
            .collect::<Vec<_>>();

        match Issues::from_vec(issues) {
            Some(issues) => ParseOutcome::Failure(issues),
            None => deserialize(input),
        }
    }
}

impl<T> fmt::Debug for JsonSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("output", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Schema that relies on `T`'s `Deserialize` implementation alone.
///
/// Reports at most one issue per parse, since `serde` stops at the first
/// error.
pub struct TypedSchema<T> {
    _output: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Create a schema for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _output: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedSchema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: DeserializeOwned + 'static,
{
    type Output = T;

    fn safe_parse(&self, input: &Value) -> ParseOutcome<T> {
        deserialize(input)
    }
}
