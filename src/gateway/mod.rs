pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use openapi::ApiDoc;
use state::AppState;

/// Build the gateway router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/transfer", post(handlers::create_transfer))
        .route("/api/transfer/{key}", get(handlers::get_transfer))
        .route("/api/wallet", post(handlers::create_wallet))
        .route("/api/wallet/{id}/balance", get(handlers::get_balance))
        .route(
            "/api/wallet/{id}/transactions",
            get(handlers::get_transactions),
        )
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP gateway and serve until shutdown.
pub async fn run_server(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("OpenAPI document: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .await
        .context("Gateway server terminated")?;
    Ok(())
}
