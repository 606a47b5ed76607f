//! Paginated access statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::clock::Clock;
use crate::domain::repositories::{LinkStats, StatsFilter, StatsRepository};
use crate::error::AppError;

/// Format used for `last_accessed` in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the statistics report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsEntry {
    pub long_url: String,
    pub short_token: String,
    pub access_count: i64,
    /// `YYYY-MM-DD HH:MM:SS` in the clock's offset, `None` if never stamped.
    pub last_accessed: Option<String>,
}

/// A populated page of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsPage {
    pub total_records: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub records: Vec<StatsEntry>,
}

/// Outcome of a pagination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsReport {
    /// No mappings are stored yet.
    Empty,
    Page(StatsPage),
}

/// Service producing the paginated statistics view.
///
/// Rows are ordered by `last_accessed` descending; rows never stamped sort
/// after every stamped row, ties by mapping id.
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    /// Creates a new statistics service.
    pub fn new(repository: Arc<dyn StatsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Returns page `page` (1-based) of `page_size` records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidPagination`] if `page` or `page_size` is
    /// below 1.
    ///
    /// Returns [`AppError::PageOutOfRange`] if records exist but `page` is past
    /// the last page.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn paginate(&self, page: i64, page_size: i64) -> Result<StatsReport, AppError> {
        if page < 1 || page_size < 1 {
            return Err(AppError::invalid_pagination(
                "Pagination parameters must be positive integers.",
            ));
        }

        let total_records = self.repository.count_tracked().await?;
        if total_records == 0 {
            return Ok(StatsReport::Empty);
        }

        let total_pages = total_pages(total_records, page_size);
        if page > total_pages {
            return Err(AppError::PageOutOfRange { page, total_pages });
        }

        // page <= total_pages keeps the offset below total_records.
        let offset = (page - 1) * page_size;
        let rows = self
            .repository
            .list(StatsFilter::new(offset, page_size))
            .await?;

        tracing::debug!(page, page_size, rows = rows.len(), "Stats page loaded");

        Ok(StatsReport::Page(StatsPage {
            total_records,
            total_pages,
            current_page: page,
            records: rows.into_iter().map(|row| self.to_entry(row)).collect(),
        }))
    }

    /// Counts mappings with stats. Also serves as a storage probe.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn total_records(&self) -> Result<i64, AppError> {
        self.repository.count_tracked().await
    }

    /// Access counters for a single mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the mapping has no stats row.
    pub async fn access_count(&self, mapping_id: i64) -> Result<i64, AppError> {
        self.repository
            .find_by_mapping_id(mapping_id)
            .await?
            .map(|stats| stats.access_count)
            .ok_or_else(|| {
                AppError::internal(
                    "Stats row missing for mapping",
                    json!({ "mapping_id": mapping_id }),
                )
            })
    }

    fn to_entry(&self, row: LinkStats) -> StatsEntry {
        StatsEntry {
            long_url: row.long_url,
            short_token: row.short_token,
            access_count: row.access_count,
            last_accessed: row.last_accessed.map(|at| self.format_timestamp(at)),
        }
    }

    fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.clock.offset())
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// `ceil(total_records / page_size)` for positive inputs.
fn total_pages(total_records: i64, page_size: i64) -> i64 {
    total_records / page_size + i64::from(total_records % page_size != 0)
}
