//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::debug;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short URL for a long URL, creating or renewing its mapping.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_url": "http://localhost:3000/a1b2c3",
///   "short_token": "a1b2c3"
/// }
/// ```
///
/// Shortening the same URL again returns the same token.
///
/// # Errors
///
/// - 400 `missing_field` if the body is absent, not JSON or lacks `long_url`
/// - 400 `invalid_type` if `long_url` is not a string
/// - 400 `invalid_url_format` if `long_url` is not an absolute HTTP(S) URL
/// - 500 `generation_failure` if no collision-free token was found
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable shorten request body");
            ShortenRequest::default()
        }
    };

    let long_url = request.into_long_url()?;
    let shortened = state.link_service.shorten(&long_url).await?;

    let short_token = shortened.token().to_string();

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_url: state.short_url(&short_token),
            short_token,
        }),
    ))
}
