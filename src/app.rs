use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::panic_to_envelope;
use crate::services::MockApi;

/// Build the mock endpoint router from explicit configuration
pub fn app(config: &AppConfig) -> Router {
    let api = Arc::new(MockApi::new(config));

    let router = Router::new()
        // Public
        .route("/health", get(handlers::health))
        // Mock endpoint, served at both the root and the script-style path
        .route("/", get(handlers::exec_get).post(handlers::exec_post))
        .route("/exec", get(handlers::exec_get).post(handlers::exec_post))
        .fallback(handlers::not_found)
        .with_state(api);

    with_common_layers(router, config)
}

/// Global middleware shared by every router built from this crate
pub fn with_common_layers(router: Router, config: &AppConfig) -> Router {
    let router = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_to_envelope)),
    );

    if config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    serve_on(listener, &config).await
}

pub async fn serve_on(listener: TcpListener, config: &AppConfig) -> anyhow::Result<()> {
    let local = listener.local_addr().context("listener has no local address")?;
    tracing::info!("Serves mock API listening on http://{}/exec", local);

    axum::serve(listener, app(config)).await.context("server error")?;
    Ok(())
}
