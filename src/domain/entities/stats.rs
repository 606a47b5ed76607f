//! Stats entity: access counters owned by a single mapping.

use chrono::{DateTime, Utc};

/// Access statistics for one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub id: i64,
    pub mapping_id: i64,
    pub access_count: i64,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Stats {
    pub fn new(
        id: i64,
        mapping_id: i64,
        access_count: i64,
        last_accessed: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            mapping_id,
            access_count,
            last_accessed,
        }
    }
}
