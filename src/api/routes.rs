//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler, stats_list_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`          - Shorten a long URL
/// - `GET  /resolve/{token}`  - Resolve a token to its long URL
/// - `GET  /stats`            - Paginated access statistics
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/resolve/{token}", get(resolve_handler))
        .route("/stats", get(stats_list_handler))
}
