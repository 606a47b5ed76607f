//! Mapping entity: a long URL and the short token that stands for it.

use chrono::{DateTime, TimeDelta, Utc};

/// How long a new or renewed mapping stays resolvable.
pub const EXPIRATION_WINDOW: TimeDelta = TimeDelta::minutes(30);

/// A stored long URL to short token mapping.
///
/// `long_url` and `short_token` are each unique across every row, expired or
/// not. A `None` expiration means the mapping never expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub id: i64,
    pub long_url: String,
    pub short_token: String,
    pub expiration_time: Option<DateTime<Utc>>,
}

impl Mapping {
    pub fn new(
        id: i64,
        long_url: String,
        short_token: String,
        expiration_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            long_url,
            short_token,
            expiration_time,
        }
    }

    /// Returns true if the mapping expired strictly before `now`.
    ///
    /// A mapping whose expiration equals `now` is still live.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time.is_some_and(|e| e < now)
    }
}

/// Input for creating a mapping together with its stats row.
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub long_url: String,
    pub short_token: String,
    pub expiration_time: Option<DateTime<Utc>>,
    /// Seeds `last_accessed` on the paired stats row.
    pub created_at: DateTime<Utc>,
}

impl NewMapping {
    /// A mapping that expires one [`EXPIRATION_WINDOW`] after `now`.
    pub fn expiring(
        long_url: impl Into<String>,
        short_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            long_url: long_url.into(),
            short_token: short_token.into(),
            expiration_time: Some(now + EXPIRATION_WINDOW),
            created_at: now,
        }
    }
}
