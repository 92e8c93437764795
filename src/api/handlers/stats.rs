//! Handlers for click statistics endpoints.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::stats::{
    GeographyRequest, GeographyResponse, HistogramRequest, HistogramResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Counts a link's clicks over time.
///
/// # Endpoint
///
/// `POST /api/stats/histogram`
///
/// # Request Body
///
/// ```json
/// {
///   "ending": "DOCS",
///   "start_time": "2025-01-01T00:00:00Z",   // optional, 30 days back
///   "end_time": "2025-02-01T00:00:00Z",     // optional, now
///   "interval": "day"                       // hour | day | month
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "ending": "DOCS",
///   "short_url": "https://s.example.com/DOCS",
///   "start_time": "2025-01-01T00:00:00Z",
///   "end_time": "2025-02-01T00:00:00Z",
///   "interval": "day",
///   "histogram": [
///     { "start_time": "2025-01-03T00:00:00Z", "end_time": "2025-01-04T00:00:00Z", "count": 12 }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails or the window is empty
/// - 404 Not Found if no link has this ending
pub async fn stats_histogram_handler(
    State(state): State<AppState>,
    Json(payload): Json<HistogramRequest>,
) -> Result<Json<HistogramResponse>, AppError> {
    payload.validate()?;

    let histogram = state
        .stats_service
        .histogram(
            &payload.ending,
            payload.start_time,
            payload.end_time,
            payload.interval,
        )
        .await?;
    let short_url = state.link_service.short_url(&histogram.link.ending);

    Ok(Json(HistogramResponse::from_histogram(histogram, short_url)))
}

/// Counts a link's clicks per country, region or postal code.
///
/// # Endpoint
///
/// `POST /api/stats/geography`
///
/// # Request Body
///
/// ```json
/// { "ending": "DOCS", "type": "country" }   // country | region | postal_code
/// ```
///
/// # Response
///
/// ```json
/// {
///   "ending": "DOCS",
///   "short_url": "https://s.example.com/DOCS",
///   "start_time": "2025-01-01T00:00:00Z",
///   "end_time": "2025-01-31T10:00:00Z",
///   "type": "country",
///   "locations": [ { "code": "DE", "name": "Germany", "count": 7 } ]
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails or the window is empty
/// - 404 Not Found if no link has this ending
pub async fn stats_geography_handler(
    State(state): State<AppState>,
    Json(payload): Json<GeographyRequest>,
) -> Result<Json<GeographyResponse>, AppError> {
    payload.validate()?;

    let geography = state
        .stats_service
        .geography(
            &payload.ending,
            payload.start_time,
            payload.end_time,
            payload.level,
        )
        .await?;
    let short_url = state.link_service.short_url(&geography.link.ending);

    Ok(Json(GeographyResponse::from_geography(geography, short_url)))
}
