//! Repository trait for long URL to short token mappings.

use crate::domain::entities::{Mapping, NewMapping};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Unique constraint guarding `long_url`.
pub const LONG_URL_UNIQUE: &str = "url_links_long_url_key";

/// Unique constraint guarding `short_token`.
pub const SHORT_TOKEN_UNIQUE: &str = "url_links_short_token_key";

/// Repository interface for the mapping table.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Creates a mapping and its zeroed stats row in one atomic step.
    ///
    /// Either both rows exist afterwards or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] naming [`LONG_URL_UNIQUE`] or
    /// [`SHORT_TOKEN_UNIQUE`] when the respective value is already taken.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError>;

    /// Finds a mapping by long URL, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Mapping>, AppError>;

    /// Finds a mapping by short token, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_token(&self, token: &str) -> Result<Option<Mapping>, AppError>;

    /// Moves a mapping's expiration time, keeping its token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if no mapping has this id or on storage
    /// errors.
    async fn renew(
        &self,
        mapping_id: i64,
        expiration_time: DateTime<Utc>,
    ) -> Result<Mapping, AppError>;
}
