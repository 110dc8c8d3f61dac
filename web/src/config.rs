//! Route configuration: the process-wide default error override, and a
//! factory that binds an explicit configuration to many routes.
//!
//! # Global default
//!
//! [`configure`] replaces the process-wide default, last writer wins.
//! Routes built with [`parsing_middleware`](crate::parsing_middleware) and no
//! per-route override read it once per request through [`GlobalConfig`].
//! Nothing resets it automatically; tests that touch it call [`reset`].
//!
//! # Explicit configuration
//!
//! [`factory`] returns a [`RouteFactory`] whose routes use the bound
//! override and never look at the global default.

use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use crate::adapter::{parsing_middleware, AdapterOptions, RouteAdapter};
use crate::error_override::ErrorOverride;
use crate::validator::Validator;

/// Route-level configuration.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    /// Override for unexpected failures. Default: none (plain `500`).
    pub unexpected_error_handler: Option<ErrorOverride>,
}

impl Configuration {
    /// Configuration with the given error override.
    #[must_use]
    pub const fn with_error_handler(handler: ErrorOverride) -> Self {
        Self {
            unexpected_error_handler: Some(handler),
        }
    }
}

/// Provider of the fallback error override for routes without their own.
pub trait ConfigSource: Send + Sync + 'static {
    /// Current fallback override, if any.
    fn error_override(&self) -> Option<ErrorOverride>;
}

/// A fixed configuration is its own source.
impl ConfigSource for Configuration {
    fn error_override(&self) -> Option<ErrorOverride> {
        self.unexpected_error_handler.clone()
    }
}

static GLOBAL_CONFIG: RwLock<Configuration> = RwLock::new(Configuration {
    unexpected_error_handler: None,
});

/// Replace the process-wide default configuration.
pub fn configure(config: Configuration) {
    tracing::debug!(
        error_override = config.unexpected_error_handler.is_some(),
        "Replacing global route configuration"
    );
    *GLOBAL_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = config;
}

/// Snapshot of the process-wide default configuration.
#[must_use]
pub fn current() -> Configuration {
    GLOBAL_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Restore the process-wide default to its initial, empty state.
pub fn reset() {
    configure(Configuration::default());
}

/// [`ConfigSource`] reading the process-wide default.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalConfig;

impl ConfigSource for GlobalConfig {
    fn error_override(&self) -> Option<ErrorOverride> {
        current().unexpected_error_handler
    }
}

/// Build a [`RouteFactory`] bound to `config`.
#[must_use]
pub fn factory(config: Configuration) -> RouteFactory {
    RouteFactory { config }
}

/// Reusable route constructor bound to one [`Configuration`].
///
/// # Example
///
/// ```ignore
/// let routes = factory(Configuration::with_error_handler(
///     ErrorOverride::with_status(StatusCode::SERVICE_UNAVAILABLE),
/// ));
///
/// let app = Router::new()
///     .route("/users", post(routes.route(create_user, Validator::schema(user_schema))))
///     .route("/users", get(routes.no_input(list_users)));
/// ```
#[derive(Debug, Clone)]
pub struct RouteFactory {
    config: Configuration,
}

impl RouteFactory {
    /// The bound configuration.
    #[must_use]
    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    /// Options for routes built by this factory.
    #[must_use]
    pub fn options(&self) -> AdapterOptions {
        AdapterOptions {
            error_override: self.config.unexpected_error_handler.clone(),
            config: Arc::new(Configuration::default()),
            ..AdapterOptions::default()
        }
    }

    /// Build a route with the bound configuration.
    pub fn route<T, H, Fut, O, E>(&self, handler: H, validator: Validator<T>) -> RouteAdapter<T>
    where
        T: Send + 'static,
        H: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        O: Serialize + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        parsing_middleware(handler, validator, self.options())
    }

    /// Build a route without input with the bound configuration.
    pub fn no_input<H, Fut, O, E>(&self, handler: H) -> RouteAdapter<()>
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        O: Serialize + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        self.route(move |()| handler(), Validator::none())
    }
}
