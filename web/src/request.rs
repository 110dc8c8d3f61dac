//! Request snapshots handed to extraction functions and error overrides.
//!
//! - [`RequestContext`]: method, URI, headers and correlation ID
//! - [`RawRequest`]: the context plus path params, query params and body
//!
//! # Correlation IDs
//!
//! Every invocation carries a correlation ID. It is taken from the
//! `X-Correlation-ID` header when that parses as a UUID, otherwise a new
//! UUID v4 is generated. The adapter echoes it back in the response.

use axum::{
    body::{Body, Bytes},
    extract::{
        path::ErrorKind, rejection::PathRejection, FromRequestParts, Path, Query,
    },
    http::{request::Parts, HeaderMap, Method, Uri},
};
use serde_json::Value;
use uuid::Uuid;
use validated_routes_core::{merge_request_data, Issue, IssueCode, ParseOutcome};

use crate::error::UnexpectedError;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Read-only view of the request being handled.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    correlation_id: Uuid,
}

impl RequestContext {
    /// Capture the context of a request from its parts.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            correlation_id: correlation_id(&parts.headers),
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Correlation ID of this invocation.
    #[must_use]
    pub const fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Extract the correlation ID from headers, or generate a new one.
fn correlation_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Fully buffered request, as seen by custom extraction functions.
///
/// # Example
///
/// ```ignore
/// use validated_routes_core::{ParseOutcome, Schema};
/// use validated_routes_web::RawRequest;
///
/// fn only_body(request: &RawRequest) -> anyhow::Result<ParseOutcome<User>> {
///     let body = request.body_json()?.unwrap_or_default();
///     Ok(USER_SCHEMA.safe_parse(&body))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RawRequest {
    context: RequestContext,
    params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Bytes,
}

impl RawRequest {
    /// Assemble a raw request from already-extracted pieces.
    #[must_use]
    pub const fn new(
        context: RequestContext,
        params: Vec<(String, String)>,
        query: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self {
            context,
            params,
            query,
            body,
        }
    }

    /// Buffer the body and collect path and query parameters.
    ///
    /// Parameters that cannot be decoded yield a [`ParseOutcome::Failure`]
    /// with an `invalid_value` issue; the body is not read in that case.
    ///
    /// # Errors
    ///
    /// Returns [`UnexpectedError::Body`] if the body cannot be read or is
    /// larger than `body_limit` bytes.
    pub async fn read(
        parts: &mut Parts,
        body: Body,
        context: RequestContext,
        body_limit: usize,
    ) -> Result<ParseOutcome<Self>, UnexpectedError> {
        let params = match Path::<Vec<(String, String)>>::from_request_parts(parts, &()).await {
            Ok(Path(params)) => params,
            // Handlers called outside a `Router` carry no params extension.
            Err(PathRejection::MissingPathParams(_)) => Vec::new(),
            Err(rejection) => return Ok(ParseOutcome::failure(path_issue(rejection))),
        };

        let query = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => pairs,
            Err(rejection) => {
                return Ok(ParseOutcome::failure(Issue::new(
                    IssueCode::InvalidValue,
                    rejection.body_text(),
                )));
            }
        };

        let body = axum::body::to_bytes(body, body_limit)
            .await
            .map_err(UnexpectedError::Body)?;

        Ok(ParseOutcome::Success(Self::new(context, params, query, body)))
    }

    /// Method, URI, headers and correlation ID.
    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        self.context.method()
    }

    /// Request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        self.context.uri()
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        self.context.headers()
    }

    /// Path parameters in route order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Look up a path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        lookup(&self.params, name)
    }

    /// Query parameters in URI order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Look up a query parameter; the last occurrence wins.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    /// Raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parse the body as JSON. A blank body yields `None`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not valid JSON.
    pub fn body_json(&self) -> Result<Option<Value>, serde_json::Error> {
        if self.body.trim_ascii().is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.body).map(Some)
    }

    /// Merge path params, JSON body and query into one object.
    ///
    /// See [`merge_request_data`] for precedence.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not valid JSON.
    pub fn aggregate(&self) -> Result<Value, serde_json::Error> {
        let body = self.body_json()?;
        Ok(merge_request_data(
            self.params.iter().cloned(),
            body.as_ref(),
            self.query.iter().cloned(),
        ))
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Issue for a path that matched a route but whose parameters did not decode.
fn path_issue(rejection: PathRejection) -> Issue {
    let message = rejection.body_text();
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => match err.into_kind() {
            ErrorKind::InvalidUtf8InPathParam { key } => Issue::new(
                IssueCode::InvalidValue,
                format!("path parameter `{key}` is not valid UTF-8 once percent-decoded"),
            )
            .at(key.as_str()),
            _ => Issue::new(IssueCode::InvalidValue, message),
        },
        _ => Issue::new(IssueCode::InvalidValue, message),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[test]
    fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let parts = parts(Request::builder().header(CORRELATION_ID_HEADER, uuid.to_string()));

        let context = RequestContext::from_parts(&parts);
        assert_eq!(context.correlation_id(), uuid);
    }

    #[test]
    fn test_invalid_correlation_id_generates_new() {
        let parts = parts(Request::builder().header(CORRELATION_ID_HEADER, "not-a-uuid"));

        let context = RequestContext::from_parts(&parts);
        assert_ne!(context.correlation_id(), Uuid::nil());
    }

    #[tokio::test]
    async fn test_read_collects_query_and_body() {
        let mut parts = parts(Request::builder().uri("/users?name=Jane&page=2"));
        let context = RequestContext::from_parts(&parts);

        let raw = RawRequest::read(&mut parts, Body::from(r#"{"id":"7"}"#), context, 1024)
            .await
            .unwrap()
            .into_result()
            .unwrap();

        assert!(raw.params().is_empty());
        assert_eq!(raw.query_param("page"), Some("2"));
        assert_eq!(
            raw.aggregate().unwrap(),
            json!({ "id": "7", "name": "Jane", "page": "2" })
        );
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_body() {
        let mut parts = parts(Request::builder().uri("/"));
        let context = RequestContext::from_parts(&parts);

        let err = RawRequest::read(&mut parts, Body::from("0123456789"), context, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, UnexpectedError::Body(_)));
    }

    #[test]
    fn test_blank_body_is_none() {
        let context = RequestContext::from_parts(&parts(Request::builder()));
        let raw = RawRequest::new(context, Vec::new(), Vec::new(), Bytes::from_static(b"  \n"));
        assert_eq!(raw.body_json().unwrap(), None);
    }

    #[test]
    fn test_malformed_body_is_error() {
        let context = RequestContext::from_parts(&parts(Request::builder()));
        let raw = RawRequest::new(context, Vec::new(), Vec::new(), Bytes::from_static(b"{oops"));
        assert!(raw.body_json().is_err());
        assert!(raw.aggregate().is_err());
    }
}
