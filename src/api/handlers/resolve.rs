//! Handler for token resolution as JSON.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::resolve::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the long URL behind a live token and counts the access.
///
/// # Endpoint
///
/// `GET /api/resolve/{token}`
///
/// # Response
///
/// ```json
/// { "original_url": "https://example.com/some/long/path" }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the token is unknown, malformed or expired.
pub async fn resolve_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let original_url = state.link_service.resolve(&token).await?;

    Ok(Json(ResolveResponse { original_url }))
}
