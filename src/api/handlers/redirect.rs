//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short token to its original URL.
///
/// # Endpoint
///
/// `GET /{token}`
///
/// Counts as a resolution: the access counter is incremented before the
/// `307 Temporary Redirect` is returned.
///
/// # Errors
///
/// Returns 404 Not Found if the token is unknown, malformed or expired.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.link_service.resolve(&token).await?;

    Ok(Redirect::temporary(&long_url))
}
