//! Demo application for validated routes.
//!
//! Wires every usage pattern into one router:
//!
//! | Route | Pattern |
//! |---|---|
//! | `POST /users` | JSON Schema over the merged request data |
//! | `POST /users/custom` | custom extraction reading only the body |
//! | `GET /users` | no input |
//! | `GET /users/:id` | path params and query merged, typed schema |
//! | `POST /fail` | per-route error override |
//! | `POST /fail/default` | process-wide default override |
//! | `POST /fail/factory` | override bound by a route factory |

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validated_routes_core::{ConfigError, JsonSchema, Schema, TypedSchema};
use validated_routes_web::{
    factory, no_input, parsing_middleware, AdapterOptions, Configuration, ErrorOverride,
    RawRequest, Validator,
};

/// Input for user creation.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,
    /// External identifier.
    pub id: String,
}

/// Output of user creation.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    /// Echoed display name.
    pub name: String,
    /// Fixed demo age.
    pub age: u32,
}

/// Input for user lookup, built from the path and query string.
#[derive(Debug, Clone, Deserialize)]
pub struct Lookup {
    /// Path parameter.
    pub id: String,
    /// Optional `?verbose=true` flag, as a string.
    #[serde(default)]
    pub verbose: Option<String>,
}

/// JSON Schema document for [`User`].
#[must_use]
pub fn user_schema_document() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "id": { "type": "string" }
        },
        "required": ["name", "id"]
    })
}

async fn create_user(user: User) -> anyhow::Result<Profile> {
    tracing::info!(user_id = %user.id, "Creating user");
    Ok(Profile {
        name: user.name,
        age: 30,
    })
}

async fn list_users() -> anyhow::Result<Vec<Profile>> {
    Ok(Vec::new())
}

async fn find_user(lookup: Lookup) -> anyhow::Result<serde_json::Value> {
    let verbose = lookup.verbose.as_deref() == Some("true");
    Ok(json!({ "id": lookup.id, "verbose": verbose }))
}

async fn always_fails() -> anyhow::Result<()> {
    Err(anyhow::anyhow!("This is an unexpected error"))
}

/// Override used by the process-wide default in `main`.
#[must_use]
pub fn default_error_override() -> ErrorOverride {
    ErrorOverride::with_status(StatusCode::SERVICE_UNAVAILABLE)
}

/// Build the demo router.
///
/// # Errors
///
/// Returns [`ConfigError`] if the user schema document fails to compile.
pub fn app() -> Result<Router, ConfigError> {
    let user_schema = Arc::new(JsonSchema::<User>::new(&user_schema_document())?);

    let create = parsing_middleware(
        create_user,
        Validator::shared_schema(user_schema.clone()),
        AdapterOptions::default(),
    );

    let body_only = {
        let schema = Arc::clone(&user_schema);
        Validator::custom(move |request: &RawRequest| {
            let body = request.body_json()?.unwrap_or_default();
            Ok(schema.safe_parse(&body))
        })
    };
    let create_custom = parsing_middleware(create_user, body_only, AdapterOptions::default());

    let find = parsing_middleware(
        find_user,
        Validator::schema(TypedSchema::<Lookup>::new()),
        AdapterOptions::default(),
    );

    let per_route = AdapterOptions::with_error_override(ErrorOverride::new(|error, _ctx| {
        Some(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Custom message for this route",
                    "cause": error.to_string(),
                })),
            )
                .into_response(),
        )
    }));

    let routes = factory(Configuration::with_error_handler(ErrorOverride::with_status(
        StatusCode::BAD_GATEWAY,
    )));

    Ok(Router::new()
        .route("/users", post(create).get(no_input(list_users, AdapterOptions::default())))
        .route("/users/custom", post(create_custom))
        .route("/users/:id", get(find))
        .route("/fail", post(no_input(always_fails, per_route)))
        .route(
            "/fail/default",
            post(no_input(always_fails, AdapterOptions::default())),
        )
        .route("/fail/factory", post(routes.no_input(always_fails))))
}
