//! Repository trait for per-mapping access statistics.

use crate::domain::entities::Stats;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A mapping joined with its stats row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub mapping_id: i64,
    pub long_url: String,
    pub short_token: String,
    pub access_count: i64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Offset/limit window over the joined statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsFilter {
    pub offset: i64,
    pub limit: i64,
}

impl StatsFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

/// Repository interface for access statistics.
///
/// Stats rows are created together with their mapping by
/// [`super::MappingRepository::create`]; this trait only reads and updates them.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Looks up the stats row owned by a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_mapping_id(&self, mapping_id: i64) -> Result<Option<Stats>, AppError>;

    /// Atomically adds one access and stamps `last_accessed`.
    ///
    /// Concurrent calls for the same mapping never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the mapping has no stats row or on
    /// storage errors.
    async fn record_access(
        &self,
        mapping_id: i64,
        accessed_at: DateTime<Utc>,
    ) -> Result<Stats, AppError>;

    /// Counts mappings that have a stats row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count_tracked(&self) -> Result<i64, AppError>;

    /// Returns one window of joined statistics.
    ///
    /// Ordered by `last_accessed` descending with nulls last, ties broken by
    /// mapping id ascending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self, filter: StatsFilter) -> Result<Vec<LinkStats>, AppError>;
}
