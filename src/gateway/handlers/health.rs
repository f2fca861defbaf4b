//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::{HealthResponse, ServicesHealth};

/// Health check endpoint
///
/// Pings both backing stores. The ledger is load-bearing: it being down
/// makes the whole service unavailable. A cache outage only degrades the
/// idempotency fast path, so it is reported but does not fail the probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Ledger store unavailable", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database_up = state.ledger.health_check().await;
    let cache_up = state.cache.ping().await.is_ok();

    if !cache_up {
        tracing::warn!("Health probe: cache store unreachable (degraded mode)");
    }

    let services = ServicesHealth {
        database: if database_up { "up" } else { "down" },
        cache: if cache_up { "up" } else { "down" },
    };

    if database_up {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                services,
            }),
        )
    } else {
        tracing::error!("Health probe: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                services,
            }),
        )
    }
}
