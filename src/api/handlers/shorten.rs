//! Handlers for link shortening endpoints.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{
    ShortLinkResponse, ShortenBatchRequest, ShortenBatchResponse, ShortenRequest,
};
use crate::application::services::ShortenItem;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/docs",
///   "ending": "docs",        // optional, allocated when absent
///   "tags": ["team-a"]       // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "url": "https://example.com/docs",
///   "ending": "DOCS",
///   "short_url": "https://s.example.com/DOCS",
///   "tags": ["team-a"],
///   "creation_time": "2025-01-01T12:00:00Z",
///   "last_modified_time": "2025-01-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if the manual ending is taken
/// - 500 Internal Server Error if no ending could be allocated
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortLinkResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.shorten(payload.into()).await?;
    let short_url = state.link_service.short_url(&link.ending);

    Ok((
        StatusCode::CREATED,
        Json(ShortLinkResponse::from_link(link, short_url)),
    ))
}

/// Creates several short links; either all are created or none.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// { "items": [ { "url": "https://a.example" }, { "url": "https://b.example", "ending": "b" } ] }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails or a manual ending repeats
/// - 409 Conflict if a manual ending is taken
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenBatchRequest>,
) -> Result<(StatusCode, Json<ShortenBatchResponse>), AppError> {
    payload.validate()?;

    let items: Vec<ShortenItem> = payload.items.into_iter().map(Into::into).collect();
    let links = state.link_service.shorten_batch(items).await?;

    let items = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.ending);
            ShortLinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok((StatusCode::CREATED, Json(ShortenBatchResponse { items })))
}
