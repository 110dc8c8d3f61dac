//! The request adapter.
//!
//! [`RouteAdapter`] wraps a business handler and a [`Validator`] into an
//! Axum handler. Each invocation sends exactly one response:
//!
//! | Condition | Status | Body |
//! |---|---|---|
//! | handler succeeds | `200` | handler output as JSON |
//! | input fails validation | `400` | `{ "routeParsingError": [issues] }` |
//! | unexpected failure, override responds | override's | override's |
//! | unexpected failure, no override or override declines | `500` | `{ "message": "<error>" }` |
//!
//! # Flow
//!
//! 1. **Resolve** the error override (per-route first, then the config source)
//! 2. **Extract** input according to the validator variant
//! 3. **Call** the business handler with the parsed value
//! 4. **Respond**, catching handler errors and panics at this boundary
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::post, Router};
//! use validated_routes_web::{parsing_middleware, AdapterOptions, Validator};
//!
//! async fn create_user(user: User) -> anyhow::Result<Created> {
//!     // business logic
//! }
//!
//! let app = Router::new().route(
//!     "/users",
//!     post(parsing_middleware(create_user, Validator::schema(user_schema), AdapterOptions::default())),
//! );
//! ```

use axum::{
    body::Body,
    extract::Request,
    handler::Handler,
    http::{request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::any::TypeId;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;
use validated_routes_core::{Issue, IssueCode, Issues, ParseOutcome};

use crate::config::{ConfigSource, GlobalConfig};
use crate::error::{UnexpectedError, ValidationFailure};
use crate::error_override::ErrorOverride;
use crate::request::{RawRequest, RequestContext, CORRELATION_ID_HEADER};
use crate::validator::{Source, Validator};

/// Default request body limit, matching Axum's `DefaultBodyLimit` (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Metric name for adapter responses, labelled by `outcome`.
pub const RESPONSES_METRIC: &str = "validated_routes.responses";

/// Serialized handler output; `None` for handlers returning `()`.
type BoxedHandler<T> =
    Arc<dyn Fn(T) -> BoxFuture<'static, Result<Option<Value>, UnexpectedError>> + Send + Sync>;

/// Per-route options.
///
/// # Default Values
///
/// - `error_override`: `None` (fall back to `config`)
/// - `config`: [`GlobalConfig`], the process-wide default
/// - `body_limit`: [`DEFAULT_BODY_LIMIT`]
#[derive(Clone)]
pub struct AdapterOptions {
    /// Per-route override; takes precedence over `config`.
    pub error_override: Option<ErrorOverride>,
    /// Source of the fallback override when `error_override` is `None`.
    pub config: Arc<dyn ConfigSource>,
    /// Maximum body size read for schema and custom validators.
    pub body_limit: usize,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            error_override: None,
            config: Arc::new(GlobalConfig),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl AdapterOptions {
    /// Default options with a per-route error override.
    #[must_use]
    pub fn with_error_override(error_override: ErrorOverride) -> Self {
        Self {
            error_override: Some(error_override),
            ..Self::default()
        }
    }

    /// Set the body limit.
    #[must_use]
    pub const fn body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Set the fallback configuration source.
    #[must_use]
    pub fn config(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = config;
        self
    }

    fn resolve_override(&self) -> Option<ErrorOverride> {
        self.error_override
            .clone()
            .or_else(|| self.config.error_override())
    }
}

impl fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterOptions")
            .field("error_override", &self.error_override)
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

/// Build a route from a handler taking validated input.
///
/// The handler's output is serialized with `serde_json`; its error type is
/// anything convertible into [`anyhow::Error`]. A handler returning `()`
/// answers `200` with an empty body.
pub fn parsing_middleware<T, H, Fut, O, E>(
    handler: H,
    validator: Validator<T>,
    options: AdapterOptions,
) -> RouteAdapter<T>
where
    T: Send + 'static,
    H: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    O: Serialize + 'static,
    E: Into<anyhow::Error> + 'static,
{
    let handler: BoxedHandler<T> = Arc::new(move |input| {
        let fut = handler(input);
        async move {
            let output = fut
                .await
                .map_err(|err| UnexpectedError::Handler(err.into()))?;
            if TypeId::of::<O>() == TypeId::of::<()>() {
                return Ok(None);
            }
            serde_json::to_value(output)
                .map(Some)
                .map_err(UnexpectedError::Serialize)
        }
        .boxed()
    });

    RouteAdapter {
        handler,
        validator,
        options,
    }
}

/// Build a route from a handler that takes no input.
pub fn no_input<H, Fut, O, E>(handler: H, options: AdapterOptions) -> RouteAdapter<()>
where
    H: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    O: Serialize + 'static,
    E: Into<anyhow::Error> + 'static,
{
    parsing_middleware(move |()| handler(), Validator::none(), options)
}

/// Result of one dispatch, before conversion to a response.
enum Dispatched {
    Ok(Option<Value>),
    Invalid(Issues),
}

/// A business handler plus its validator, usable as an Axum handler.
///
/// Mount with any method router: `post(adapter)`, `get(adapter)`, ...
pub struct RouteAdapter<T> {
    handler: BoxedHandler<T>,
    validator: Validator<T>,
    options: AdapterOptions,
}

impl<T> Clone for RouteAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            validator: self.validator.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T> fmt::Debug for RouteAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteAdapter")
            .field("validator", &self.validator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T> RouteAdapter<T>
where
    T: Send + 'static,
{
    /// Handle one request, producing exactly one response.
    pub async fn respond(self, request: Request) -> Response {
        let (mut parts, body) = request.into_parts();
        let context = RequestContext::from_parts(&parts);
        let span = tracing::info_span!(
            "validated_route",
            correlation_id = %context.correlation_id(),
            method = %context.method(),
            uri = %context.uri(),
            validator = self.validator.kind(),
        );

        async move {
            let error_override = self.options.resolve_override();

            let outcome = AssertUnwindSafe(self.dispatch(&mut parts, body, &context))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(UnexpectedError::from_panic(&*payload)));

            let mut response = match outcome {
                Ok(Dispatched::Ok(Some(value))) => {
                    record("ok");
                    (StatusCode::OK, Json(value)).into_response()
                }
                Ok(Dispatched::Ok(None)) => {
                    record("ok");
                    StatusCode::OK.into_response()
                }
                Ok(Dispatched::Invalid(issues)) => {
                    record("invalid");
                    ValidationFailure(issues).into_response()
                }
                Err(error) => handle_unexpected(error, error_override.as_ref(), &context),
            };

            if let Ok(value) = HeaderValue::from_str(&context.correlation_id().to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }

            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        parts: &mut Parts,
        body: Body,
        context: &RequestContext,
    ) -> Result<Dispatched, UnexpectedError> {
        let input = match &self.validator.source {
            Source::Absent(unit) => unit(),
            Source::Schema(schema) => {
                let raw = match self.read(parts, body, context).await? {
                    ParseOutcome::Success(raw) => raw,
                    ParseOutcome::Failure(issues) => return Ok(Dispatched::Invalid(issues)),
                };
                let data = match raw.aggregate() {
                    Ok(data) => data,
                    Err(err) => {
                        return Ok(Dispatched::Invalid(Issues::single(Issue::new(
                            IssueCode::InvalidBody,
                            format!("request body is not valid JSON: {err}"),
                        ))));
                    }
                };
                match schema.safe_parse(&data) {
                    ParseOutcome::Success(input) => input,
                    ParseOutcome::Failure(issues) => return Ok(Dispatched::Invalid(issues)),
                }
            }
            Source::Custom(extract) => {
                let raw = match self.read(parts, body, context).await? {
                    ParseOutcome::Success(raw) => raw,
                    ParseOutcome::Failure(issues) => return Ok(Dispatched::Invalid(issues)),
                };
                match extract(&raw).map_err(UnexpectedError::Extraction)? {
                    ParseOutcome::Success(input) => input,
                    ParseOutcome::Failure(issues) => return Ok(Dispatched::Invalid(issues)),
                }
            }
        };

        let output = (self.handler)(input).await?;
        Ok(Dispatched::Ok(output))
    }

    async fn read(
        &self,
        parts: &mut Parts,
        body: Body,
        context: &RequestContext,
    ) -> Result<ParseOutcome<RawRequest>, UnexpectedError> {
        RawRequest::read(parts, body, context.clone(), self.options.body_limit).await
    }
}

/// Give the override a chance to respond, then fall back to `500`.
fn handle_unexpected(
    error: UnexpectedError,
    error_override: Option<&ErrorOverride>,
    context: &RequestContext,
) -> Response {
    if let Some(hook) = error_override {
        let handled = std::panic::catch_unwind(AssertUnwindSafe(|| hook.invoke(&error, context)));
        match handled {
            Ok(Some(response)) => {
                tracing::warn!(
                    kind = error.kind(),
                    error = %error,
                    status = %response.status(),
                    "Unexpected error handled by override"
                );
                record("override");
                return response;
            }
            Ok(None) => {}
            Err(payload) => {
                let panic = UnexpectedError::from_panic(&*payload);
                tracing::error!(error = %panic, "Error override panicked");
            }
        }
    }

    record("error");
    error.into_response()
}

fn record(outcome: &'static str) {
    metrics::counter!(RESPONSES_METRIC, "outcome" => outcome).increment(1);
}

/// Marker type selecting the [`Handler`] impl for [`RouteAdapter`].
#[derive(Debug, Clone, Copy)]
pub struct AdapterMarker;

impl<T, S> Handler<AdapterMarker, S> for RouteAdapter<T>
where
    T: Send + 'static,
    S: Send + Sync + 'static,
{
    type Future = BoxFuture<'static, Response>;

    fn call(self, req: Request, _state: S) -> Self::Future {
        self.respond(req).boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use axum::{body::to_bytes, routing::post, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use uuid::Uuid;
    use validated_routes_core::TypedSchema;

    fn isolated() -> AdapterOptions {
        AdapterOptions::default().config(Arc::new(crate::Configuration::default()))
    }

    async fn call(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_no_input_route() {
        let route = no_input(|| async { Ok::<_, anyhow::Error>(vec!["a", "b"]) }, isolated());
        let app = Router::new().route("/test", post(route));

        let (status, body) = call(app, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_validation_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = Arc::clone(&calls);
        let route = parsing_middleware(
            move |value: Value| {
                probe.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, anyhow::Error>(value) }
            },
            Validator::schema(TypedSchema::<Value>::new()),
            isolated(),
        );
        let app = Router::new().route("/test", post(route));

        let (status, body) = call(app, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["routeParsingError"][0]["code"], json!("invalid_body"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500() {
        async fn explode() -> anyhow::Result<()> {
            panic!("kaboom")
        }

        let app = Router::new().route("/test", post(no_input(explode, isolated())));

        let (status, body) = call(app, "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "handler panicked: kaboom" }));
    }

    #[tokio::test]
    async fn test_panicking_override_falls_back_to_500() {
        let options = AdapterOptions::with_error_override(ErrorOverride::new(|_, _| {
            panic!("override broke")
        }))
        .config(Arc::new(crate::Configuration::default()));
        let route = no_input(|| async { Err::<(), _>(anyhow::anyhow!("boom")) }, options);
        let app = Router::new().route("/test", post(route));

        let (status, body) = call(app, "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "boom" }));
    }

    #[tokio::test]
    async fn test_body_over_limit_is_unexpected() {
        let route = parsing_middleware(
            |value: Value| async move { Ok::<_, anyhow::Error>(value) },
            Validator::schema(TypedSchema::<Value>::new()),
            isolated().body_limit(8),
        );
        let app = Router::new().route("/test", post(route));

        let (status, _) = call(app, r#"{"name":"a long enough body"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_correlation_id_echoed() {
        let route = no_input(|| async { Ok::<_, anyhow::Error>("ok") }, isolated());
        let app = Router::new().route("/test", post(route));

        let id = Uuid::new_v4();
        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header(CORRELATION_ID_HEADER, id.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let echoed = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap();
        assert_eq!(echoed, id.to_string());
    }

    #[tokio::test]
    async fn test_unserializable_output_is_500() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot serialize"))
            }
        }

        let route = no_input(|| async { Ok::<_, anyhow::Error>(Broken) }, isolated());
        let app = Router::new().route("/test", post(route));

        let (status, body) = call(app, "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("failed to serialize handler output")
        );
    }
}
