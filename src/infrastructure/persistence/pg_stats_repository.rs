//! PostgreSQL implementation of the statistics repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Stats;
use crate::domain::repositories::{LinkStats, StatsFilter, StatsRepository};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct StatsRow {
    id: i64,
    mapping_id: i64,
    access_count: i64,
    last_accessed: Option<DateTime<Utc>>,
}

impl From<StatsRow> for Stats {
    fn from(r: StatsRow) -> Self {
        Stats::new(r.id, r.mapping_id, r.access_count, r.last_accessed)
    }
}

#[derive(sqlx::FromRow)]
struct LinkStatsRow {
    mapping_id: i64,
    long_url: String,
    short_token: String,
    access_count: i64,
    last_accessed: Option<DateTime<Utc>>,
}

/// PostgreSQL repository for the `url_stats` table.
///
/// The access increment is a single `UPDATE`, so concurrent resolutions of
/// the same token never lose a count.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn find_by_mapping_id(&self, mapping_id: i64) -> Result<Option<Stats>, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT id, mapping_id, access_count, last_accessed
            FROM url_stats
            WHERE mapping_id = $1
            "#,
        )
        .bind(mapping_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Stats::from))
    }

    async fn record_access(
        &self,
        mapping_id: i64,
        accessed_at: DateTime<Utc>,
    ) -> Result<Stats, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            UPDATE url_stats
            SET access_count = access_count + 1,
                last_accessed = $2
            WHERE mapping_id = $1
            RETURNING id, mapping_id, access_count, last_accessed
            "#,
        )
        .bind(mapping_id)
        .bind(accessed_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Stats::from).ok_or_else(|| {
            AppError::internal(
                "Stats row missing for mapping",
                json!({ "mapping_id": mapping_id }),
            )
        })
    }

    async fn count_tracked(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM url_links l
            JOIN url_stats s ON s.mapping_id = l.id
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn list(&self, filter: StatsFilter) -> Result<Vec<LinkStats>, AppError> {
        let rows = sqlx::query_as::<_, LinkStatsRow>(
            r#"
            SELECT
                l.id AS mapping_id,
                l.long_url,
                l.short_token,
                s.access_count,
                s.last_accessed
            FROM url_links l
            JOIN url_stats s ON s.mapping_id = l.id
            ORDER BY s.last_accessed DESC NULLS LAST, l.id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkStats {
                mapping_id: r.mapping_id,
                long_url: r.long_url,
                short_token: r.short_token,
                access_count: r.access_count,
                last_accessed: r.last_accessed,
            })
            .collect())
    }
}
