//! Request-data aggregation.
//!
//! Schemas see one JSON object built from three request sources, merged in
//! a fixed order:
//!
//! 1. path parameters
//! 2. body (only when it is a JSON object)
//! 3. query parameters
//!
//! Later sources overwrite earlier ones key by key, so the body beats path
//! parameters and the query string beats both.

use serde_json::{Map, Value};

/// Merge path parameters, body and query parameters into one JSON object.
///
/// Path and query values are kept as JSON strings; coercion is the schema's
/// business. A body that is not a JSON object contributes nothing.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use validated_routes_core::merge_request_data;
///
/// let merged = merge_request_data(
///     [("id".to_string(), "from-path".to_string())],
///     Some(&json!({ "id": "from-body", "name": "John" })),
///     [("name".to_string(), "from-query".to_string())],
/// );
///
/// assert_eq!(merged, json!({ "id": "from-body", "name": "from-query" }));
/// ```
pub fn merge_request_data<P, Q>(params: P, body: Option<&Value>, query: Q) -> Value
where
    P: IntoIterator<Item = (String, String)>,
    Q: IntoIterator<Item = (String, String)>,
{
    let mut merged = Map::new();

    for (key, value) in params {
        merged.insert(key, Value::String(value));
    }

    if let Some(Value::Object(fields)) = body {
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in query {
        merged.insert(key, Value::String(value));
    }

    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_empty_sources() {
        assert_eq!(merge_request_data(pairs(&[]), None, pairs(&[])), json!({}));
    }

    #[test]
    fn test_non_object_body_ignored() {
        let merged = merge_request_data(pairs(&[("id", "1")]), Some(&json!([1, 2])), pairs(&[]));
        assert_eq!(merged, json!({ "id": "1" }));

        let merged = merge_request_data(pairs(&[]), Some(&Value::Null), pairs(&[]));
        assert_eq!(merged, json!({}));
    }

    #[test]
    fn test_body_keeps_json_types() {
        let merged = merge_request_data(
            pairs(&[]),
            Some(&json!({ "age": 30, "tags": ["a"] })),
            pairs(&[]),
        );
        assert_eq!(merged, json!({ "age": 30, "tags": ["a"] }));
    }

    #[test]
    fn test_precedence() {
        let merged = merge_request_data(
            pairs(&[("a", "path"), ("b", "path"), ("c", "path")]),
            Some(&json!({ "b": "body", "c": "body" })),
            pairs(&[("c", "query")]),
        );
        assert_eq!(merged, json!({ "a": "path", "b": "body", "c": "query" }));
    }
}
