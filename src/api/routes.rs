//! API route configuration.
//!
//! All API endpoints require Bearer API key authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    shorten_batch_handler, shorten_handler, stats_geography_handler, stats_histogram_handler,
};
use crate::state::AppState;
use axum::{Router, routing::post};

/// All API routes, protected by Bearer API key authentication.
///
/// # Endpoints
///
/// - `POST /shorten`        - Create one short link
/// - `POST /shorten/batch`  - Create several short links as one unit
/// - `POST /stats/histogram` - Clicks on one link over time
/// - `POST /stats/geography` - Clicks on one link per place
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route("/stats/histogram", post(stats_histogram_handler))
        .route("/stats/geography", post(stats_geography_handler))
}
