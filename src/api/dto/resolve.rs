//! DTOs for token resolution.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub original_url: String,
}
