//! Error overrides: caller-controlled responses for unexpected failures.
//!
//! An override sees the failing [`UnexpectedError`] and the
//! [`RequestContext`] and may return a [`Response`]. Returning `None` means
//! "not handled here"; the adapter then sends its default `500`.
//!
//! Validation failures never reach an override.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

use crate::error::UnexpectedError;
use crate::request::RequestContext;

type OverrideFn = dyn Fn(&UnexpectedError, &RequestContext) -> Option<Response> + Send + Sync;

/// Callback invoked on unexpected (non-validation) failures.
///
/// # Example
///
/// ```ignore
/// use axum::{http::StatusCode, response::IntoResponse};
/// use validated_routes_web::ErrorOverride;
///
/// let hook = ErrorOverride::new(|error, ctx| {
///     tracing::warn!(correlation_id = %ctx.correlation_id(), %error, "route failed");
///     Some((StatusCode::BAD_GATEWAY, "upstream failure").into_response())
/// });
/// ```
#[derive(Clone)]
pub struct ErrorOverride(Arc<OverrideFn>);

impl ErrorOverride {
    /// Wrap a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&UnexpectedError, &RequestContext) -> Option<Response> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Override that always answers with `status` and
    /// `{ "message": "<error>" }`.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self::new(move |error, _ctx| {
            Some((status, Json(json!({ "message": error.to_string() }))).into_response())
        })
    }

    /// Run the callback.
    #[must_use]
    pub fn invoke(&self, error: &UnexpectedError, context: &RequestContext) -> Option<Response> {
        (self.0)(error, context)
    }

    /// Whether two handles share the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ErrorOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorOverride").finish_non_exhaustive()
    }
}
