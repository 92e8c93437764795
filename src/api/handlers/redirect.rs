//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;

use crate::domain::click_event::VisitContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_meta::{client_ip, do_not_track, referrer, user_agent};

/// Redirects an ending to its target URL.
///
/// # Endpoint
///
/// `GET /{ending}`
///
/// # Request Flow
///
/// 1. Resolve the ending (exact, then with confusable symbols normalized)
/// 2. Queue a visit event for the background click worker
/// 3. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Visits are sent to a bounded channel for async attribution. If the queue
/// is full, the visit is dropped (fire-and-forget); the redirect never waits
/// on geolocation or the database.
///
/// # Errors
///
/// Returns 404 Not Found if the ending doesn't exist.
pub async fn redirect_handler(
    Path(ending): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve(&ending).await?;

    let context = VisitContext {
        ip: client_ip(&headers, addr, state.behind_proxy),
        user_agent: user_agent(&headers),
        referrer: referrer(&headers),
        do_not_track: do_not_track(&headers),
    };
    state
        .click_queue
        .record_visit(link.id, &link.ending, &link.target_url, context);

    Ok(Redirect::temporary(&link.target_url))
}
