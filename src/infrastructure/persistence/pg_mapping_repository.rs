//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct MappingRow {
    id: i64,
    long_url: String,
    short_token: String,
    expiration_time: Option<DateTime<Utc>>,
}

impl From<MappingRow> for Mapping {
    fn from(r: MappingRow) -> Self {
        Mapping::new(r.id, r.long_url, r.short_token, r.expiration_time)
    }
}

/// PostgreSQL repository for the `url_links` table.
///
/// Uses bound parameters for every query. Mapping creation also inserts the
/// paired `url_stats` row inside the same transaction.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            INSERT INTO url_links (long_url, short_token, expiration_time)
            VALUES ($1, $2, $3)
            RETURNING id, long_url, short_token, expiration_time
            "#,
        )
        .bind(&new_mapping.long_url)
        .bind(&new_mapping.short_token)
        .bind(new_mapping.expiration_time)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO url_stats (mapping_id, access_count, last_accessed)
            VALUES ($1, 0, $2)
            "#,
        )
        .bind(row.id)
        .bind(new_mapping.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, long_url, short_token, expiration_time
            FROM url_links
            WHERE long_url = $1
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, long_url, short_token, expiration_time
            FROM url_links
            WHERE short_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn renew(
        &self,
        mapping_id: i64,
        expiration_time: DateTime<Utc>,
    ) -> Result<Mapping, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            UPDATE url_links
            SET expiration_time = $2
            WHERE id = $1
            RETURNING id, long_url, short_token, expiration_time
            "#,
        )
        .bind(mapping_id)
        .bind(expiration_time)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Mapping::from).ok_or_else(|| {
            AppError::internal(
                "Mapping to renew does not exist",
                json!({ "mapping_id": mapping_id }),
            )
        })
    }
}
