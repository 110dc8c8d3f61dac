//! Tagged parse results.
//!
//! Parsing never fails with an error value: malformed input is an expected
//! outcome, represented by [`ParseOutcome::Failure`].

use crate::issue::{Issue, Issues};

/// Result of a non-throwing parse.
///
/// # Examples
///
/// ```
/// use validated_routes_core::{Issue, ParseOutcome};
///
/// let ok: ParseOutcome<u32> = ParseOutcome::Success(7);
/// assert_eq!(ok.map(|n| n * 2).into_result().ok(), Some(14));
///
/// let failed: ParseOutcome<u32> = ParseOutcome::failure(Issue::custom("nope"));
/// assert!(!failed.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    /// Input satisfied the schema; carries the parsed value.
    Success(T),
    /// Input violated the schema; carries at least one issue.
    Failure(Issues),
}

impl<T> ParseOutcome<T> {
    /// Failure with a single issue.
    #[must_use]
    pub fn failure(issue: Issue) -> Self {
        Self::Failure(Issues::single(issue))
    }

    /// Whether parsing succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the issues when parsing failed.
    pub fn into_result(self) -> Result<T, Issues> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(issues) => Err(issues),
        }
    }

    /// Transform the parsed value, leaving failures untouched.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Success(value) => ParseOutcome::Success(f(value)),
            Self::Failure(issues) => ParseOutcome::Failure(issues),
        }
    }

    /// Chain a further parse step onto a successful value.
    #[must_use]
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ParseOutcome<U>) -> ParseOutcome<U> {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(issues) => ParseOutcome::Failure(issues),
        }
    }
}

impl<T> From<Result<T, Issues>> for ParseOutcome<T> {
    fn from(result: Result<T, Issues>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(issues) => Self::Failure(issues),
        }
    }
}
