//! Error types for validated routes.
//!
//! This module defines the two request-scoped failure kinds and how each one
//! becomes an HTTP response:
//!
//! - [`ValidationFailure`]: expected, field-level, answered with `400`
//! - [`UnexpectedError`]: anything else, answered with `500` unless an
//!   [`ErrorOverride`](crate::ErrorOverride) takes over

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use validated_routes_core::Issues;

/// Field name carrying validation issues in a `400` body.
pub const VALIDATION_ERROR_FIELD: &str = "routeParsingError";

/// Failures that are not validation failures.
///
/// These are caught at the adapter boundary and never reach the host
/// framework's own error handling.
#[derive(thiserror::Error, Debug)]
pub enum UnexpectedError {
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// A custom extraction function returned an error.
    #[error("{0}")]
    Extraction(anyhow::Error),

    /// The business handler returned an error.
    #[error("{0}")]
    Handler(anyhow::Error),

    /// The business handler or extraction function panicked.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// The handler's output could not be serialized to JSON.
    #[error("failed to serialize handler output: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl UnexpectedError {
    /// Build a [`UnexpectedError::Panic`] from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::Panic(message)
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Body(_) => "body",
            Self::Extraction(_) => "extraction",
            Self::Handler(_) => "handler",
            Self::Panic(_) => "panic",
            Self::Serialize(_) => "serialize",
        }
    }
}

/// Default `500` response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for UnexpectedError {
    fn into_response(self) -> Response {
        tracing::error!(
            kind = self.kind(),
            error = %self,
            "Unexpected error in validated route"
        );

        let body = ErrorResponse {
            message: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Input failed validation; the handler was not invoked.
///
/// Responds with `400` and `{ "routeParsingError": [issues...] }`.
#[derive(Debug, Clone)]
pub struct ValidationFailure(pub Issues);

#[derive(Serialize)]
struct ValidationResponse {
    #[serde(rename = "routeParsingError")]
    route_parsing_error: Issues,
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        tracing::debug!(issues = self.0.len(), "Request input failed validation");

        let body = ValidationResponse {
            route_parsing_error: self.0,
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use validated_routes_core::Issue;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_handler_error_display_is_raw() {
        let err = UnexpectedError::Handler(anyhow::anyhow!("database offline"));
        assert_eq!(err.to_string(), "database offline");
        assert_eq!(err.kind(), "handler");
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = UnexpectedError::from_panic(&"boom");
        assert_eq!(err.to_string(), "handler panicked: boom");

        let err = UnexpectedError::from_panic(&String::from("owned boom"));
        assert_eq!(err.to_string(), "handler panicked: owned boom");

        let err = UnexpectedError::from_panic(&42_u8);
        assert_eq!(err.to_string(), "handler panicked: unknown panic payload");
    }

    #[tokio::test]
    async fn test_unexpected_error_response() {
        let response = UnexpectedError::Handler(anyhow::anyhow!("nope")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, serde_json::json!({ "message": "nope" }));
    }

    #[tokio::test]
    async fn test_validation_failure_response() {
        let issues = Issues::single(Issue::custom("required").at("id"));
        let response = ValidationFailure(issues).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let list = body[VALIDATION_ERROR_FIELD].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["path"], serde_json::json!(["id"]));
    }
}
