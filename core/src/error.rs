//! Configuration errors.
//!
//! These are programmer errors raised while wiring routes together. They are
//! never turned into HTTP responses.

use thiserror::Error;

/// Errors raised while constructing validators and adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The supplied validator is neither a usable schema nor a custom
    /// extraction function.
    #[error("validator must be a schema or a custom extraction function: {reason}")]
    InvalidValidator {
        /// What was wrong with the supplied validator.
        reason: String,
    },
}

impl ConfigError {
    /// Create an [`ConfigError::InvalidValidator`] error.
    #[must_use]
    pub fn invalid_validator(reason: impl Into<String>) -> Self {
        Self::InvalidValidator {
            reason: reason.into(),
        }
    }
}
