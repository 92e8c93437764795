//! Handler for the health endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Reports whether the store answers and the click queue accepts visits.
///
/// `GET /health` answers 200 when every check passes and 503 otherwise, with
/// the same body:
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected, 1200 pooled endings" },
///     "click_queue": { "status": "ok", "message": "Capacity: 10000" }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checks = HealthChecks {
        database: match state.link_service.ending_pool().pool_size().await {
            Ok(size) => CheckStatus::ok(format!("Connected, {size} pooled endings")),
            Err(e) => CheckStatus::error(format!("Database error: {e}")),
        },
        click_queue: if state.click_queue.is_closed() {
            CheckStatus::error("Click queue is closed")
        } else {
            CheckStatus::ok(format!("Capacity: {}", state.click_queue.capacity()))
        },
    };

    let healthy = checks.database.is_ok() && checks.click_queue.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks,
        }),
    )
}
