//! Bearer API key authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Authenticates requests using API keys from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <api-key>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, malformed, or carries
/// a key that is not configured in `API_KEYS`.
///
/// Adds `WWW-Authenticate: Bearer` header to 401 responses per RFC 6750.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(key) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    st.auth_service.authenticate(&key)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}
