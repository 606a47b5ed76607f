//! Handler for paginated link statistics.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::api::dto::pagination::PaginationParams;
use crate::api::dto::stats_list::StatsListResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Retrieves access statistics for all mappings, most recently used first.
///
/// # Endpoint
///
/// `GET /api/stats`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 10)
///
/// # Response
///
/// ```json
/// {
///   "total_records": 25,
///   "total_pages": 3,
///   "current_page": 1,
///   "records": [
///     {
///       "long_url": "https://example.com",
///       "short_token": "a1b2c3",
///       "short_url": "http://localhost:3000/a1b2c3",
///       "access_count": 4,
///       "last_accessed": "2024-06-01 12:45:09"
///     }
///   ]
/// }
/// ```
///
/// With nothing stored the body is `{"message": "No data available."}`.
///
/// # Errors
///
/// - 400 `invalid_pagination` if a parameter is not an integer or is below 1
/// - 404 `page_out_of_range` if `page` is past the last page
pub async fn stats_list_handler(
    State(state): State<AppState>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<StatsListResponse>, AppError> {
    let Query(params) = params.map_err(|_| {
        AppError::invalid_pagination("Pagination parameters must be positive integers.")
    })?;

    let report = state
        .stats_service
        .paginate(params.page(), params.page_size())
        .await?;

    Ok(Json(StatsListResponse::from_report(report, |token| {
        state.short_url(token)
    })))
}
