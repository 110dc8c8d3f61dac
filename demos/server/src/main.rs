//! Demo server for validated routes.
//!
//! Run with: `cargo run -p validated-routes-demo`
//!
//! Try:
//!
//! ```bash
//! curl -X POST localhost:3000/users -H 'content-type: application/json' \
//!      -d '{"name":"John","id":"12323232"}'
//! curl -X POST localhost:3000/users -H 'content-type: application/json' \
//!      -d '{"name":"John","id":123}'
//! curl -X POST localhost:3000/fail/default
//! ```

use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validated_routes_demo::{app, default_error_override};
use validated_routes_web::{configure, Configuration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "validated_routes_demo=info,validated_routes_web=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Routes without their own override fall back to this one.
    configure(Configuration::with_error_handler(default_error_override()));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = app()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("  POST /users          - JSON Schema validation");
    info!("  POST /users/custom   - custom extraction (body only)");
    info!("  GET  /users          - no input");
    info!("  GET  /users/:id      - path + query");
    info!("  POST /fail           - per-route error override");
    info!("  POST /fail/default   - global default override");
    info!("  POST /fail/factory   - factory-bound override");

    axum::serve(listener, app).await?;

    Ok(())
}
