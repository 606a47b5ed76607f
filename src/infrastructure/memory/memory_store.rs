//! Lock-guarded in-memory implementation of both repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use crate::domain::entities::{Mapping, NewMapping, Stats};
use crate::domain::repositories::{
    LONG_URL_UNIQUE, LinkStats, MappingRepository, SHORT_TOKEN_UNIQUE, StatsFilter,
    StatsRepository,
};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Tables {
    next_mapping_id: i64,
    next_stats_id: i64,
    mappings: BTreeMap<i64, Mapping>,
    by_long_url: HashMap<String, i64>,
    by_token: HashMap<String, i64>,
    /// Keyed by mapping id.
    stats: BTreeMap<i64, Stats>,
}

impl Tables {
    fn mapping(&self, id: Option<&i64>) -> Option<Mapping> {
        id.and_then(|id| self.mappings.get(id)).cloned()
    }
}

/// Mapping and stats tables behind one mutex.
///
/// Every operation takes the lock once, so pair creation, uniqueness checks
/// and increments are atomic with respect to each other. Unique violations
/// are reported with the same constraint names as the PostgreSQL schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MappingRepository for MemoryStore {
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        let mut tables = self.tables.lock().await;

        if tables.by_long_url.contains_key(&new_mapping.long_url) {
            return Err(AppError::Conflict {
                constraint: Some(LONG_URL_UNIQUE.to_string()),
            });
        }
        if tables.by_token.contains_key(&new_mapping.short_token) {
            return Err(AppError::Conflict {
                constraint: Some(SHORT_TOKEN_UNIQUE.to_string()),
            });
        }

        tables.next_mapping_id += 1;
        tables.next_stats_id += 1;
        let mapping_id = tables.next_mapping_id;
        let stats_id = tables.next_stats_id;

        let mapping = Mapping::new(
            mapping_id,
            new_mapping.long_url,
            new_mapping.short_token,
            new_mapping.expiration_time,
        );

        tables
            .by_long_url
            .insert(mapping.long_url.clone(), mapping_id);
        tables
            .by_token
            .insert(mapping.short_token.clone(), mapping_id);
        tables.mappings.insert(mapping_id, mapping.clone());
        tables.stats.insert(
            mapping_id,
            Stats::new(stats_id, mapping_id, 0, Some(new_mapping.created_at)),
        );

        Ok(mapping)
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Mapping>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.mapping(tables.by_long_url.get(long_url)))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Mapping>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.mapping(tables.by_token.get(token)))
    }

    async fn renew(
        &self,
        mapping_id: i64,
        expiration_time: DateTime<Utc>,
    ) -> Result<Mapping, AppError> {
        let mut tables = self.tables.lock().await;

        let mapping = tables.mappings.get_mut(&mapping_id).ok_or_else(|| {
            AppError::internal(
                "Mapping to renew does not exist",
                json!({ "mapping_id": mapping_id }),
            )
        })?;
        mapping.expiration_time = Some(expiration_time);

        Ok(mapping.clone())
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn find_by_mapping_id(&self, mapping_id: i64) -> Result<Option<Stats>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.stats.get(&mapping_id).cloned())
    }

    async fn record_access(
        &self,
        mapping_id: i64,
        accessed_at: DateTime<Utc>,
    ) -> Result<Stats, AppError> {
        let mut tables = self.tables.lock().await;

        let stats = tables.stats.get_mut(&mapping_id).ok_or_else(|| {
            AppError::internal(
                "Stats row missing for mapping",
                json!({ "mapping_id": mapping_id }),
            )
        })?;
        stats.access_count += 1;
        stats.last_accessed = Some(accessed_at);

        Ok(stats.clone())
    }

    async fn count_tracked(&self) -> Result<i64, AppError> {
        let tables = self.tables.lock().await;
        let count = tables
            .mappings
            .keys()
            .filter(|id| tables.stats.contains_key(id))
            .count();

        Ok(count as i64)
    }

    async fn list(&self, filter: StatsFilter) -> Result<Vec<LinkStats>, AppError> {
        let tables = self.tables.lock().await;

        let mut rows: Vec<LinkStats> = tables
            .mappings
            .values()
            .filter_map(|mapping| {
                tables.stats.get(&mapping.id).map(|stats| LinkStats {
                    mapping_id: mapping.id,
                    long_url: mapping.long_url.clone(),
                    short_token: mapping.short_token.clone(),
                    access_count: stats.access_count,
                    last_accessed: stats.last_accessed,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            by_last_accessed_desc_nulls_last(a.last_accessed, b.last_accessed)
                .then(a.mapping_id.cmp(&b.mapping_id))
        });

        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);

        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }
}

fn by_last_accessed_desc_nulls_last(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
