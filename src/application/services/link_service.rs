//! Mapping creation, renewal and resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{EXPIRATION_WINDOW, Mapping, NewMapping};
use crate::domain::repositories::{
    LONG_URL_UNIQUE, MappingRepository, SHORT_TOKEN_UNIQUE, StatsRepository,
};
use crate::error::AppError;
use crate::utils::token_generator::{MAX_TOKEN_ATTEMPTS, generate_token, is_well_formed_token};
use crate::utils::url_validator::validate_long_url;

/// What `shorten` did to produce its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortenOutcome {
    /// A new mapping and stats pair was stored.
    Created,
    /// A live mapping already existed and was returned untouched.
    Existing,
    /// An expired mapping had its expiration pushed forward.
    Renewed,
}

/// Result of a successful `shorten`.
#[derive(Debug, Clone)]
pub struct Shortened {
    pub mapping: Mapping,
    pub outcome: ShortenOutcome,
}

impl Shortened {
    pub fn token(&self) -> &str {
        &self.mapping.short_token
    }
}

/// Service for shortening long URLs and resolving short tokens.
///
/// A long URL keeps the same token for its whole lifetime: expired mappings
/// are renewed in place, never duplicated. Resolving a live token counts one
/// access on its stats row.
pub struct LinkService {
    mappings: Arc<dyn MappingRepository>,
    stats: Arc<dyn StatsRepository>,
    clock: Arc<dyn Clock>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        mappings: Arc<dyn MappingRepository>,
        stats: Arc<dyn StatsRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            mappings,
            stats,
            clock,
        }
    }

    /// Returns the short token for `long_url`, creating or renewing the mapping
    /// as needed.
    ///
    /// - live mapping: returned as is, no writes
    /// - expired mapping: expiration set to now + 30 minutes, same token
    /// - no mapping: new mapping and zeroed stats stored atomically
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MissingField`] for an empty URL and
    /// [`AppError::InvalidUrlFormat`] for anything that is not an absolute
    /// HTTP/HTTPS URL. Nothing is written in either case.
    ///
    /// Returns [`AppError::GenerationFailure`] if every token candidate is
    /// held by another URL.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn shorten(&self, long_url: &str) -> Result<Shortened, AppError> {
        validate_long_url(long_url)?;

        let now = self.clock.now_utc();

        if let Some(existing) = self.mappings.find_by_long_url(long_url).await? {
            return self.reuse(existing, now).await;
        }

        self.create(long_url, now).await
    }

    /// Returns the long URL behind a live token and counts the access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token is unknown or its mapping
    /// has expired. No access is counted in that case.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, token: &str) -> Result<String, AppError> {
        if !is_well_formed_token(token) {
            metrics::counter!("tinylink_resolve_not_found_total").increment(1);
            return Err(AppError::not_found(token));
        }

        let now = self.clock.now_utc();

        let mapping = match self.mappings.find_by_token(token).await? {
            Some(mapping) if !mapping.is_expired_at(now) => mapping,
            Some(_) => {
                debug!(token, "Token expired");
                metrics::counter!("tinylink_resolve_not_found_total").increment(1);
                return Err(AppError::not_found(token));
            }
            None => {
                metrics::counter!("tinylink_resolve_not_found_total").increment(1);
                return Err(AppError::not_found(token));
            }
        };

        let stats = self.stats.record_access(mapping.id, now).await?;
        debug!(token, access_count = stats.access_count, "Token resolved");
        metrics::counter!("tinylink_resolved_total").increment(1);

        Ok(mapping.long_url)
    }

    /// Returns the existing token, renewing the mapping first if it expired.
    async fn reuse(&self, existing: Mapping, now: DateTime<Utc>) -> Result<Shortened, AppError> {
        if !existing.is_expired_at(now) {
            metrics::counter!("tinylink_mappings_reused_total").increment(1);
            return Ok(Shortened {
                mapping: existing,
                outcome: ShortenOutcome::Existing,
            });
        }

        let renewed = self
            .mappings
            .renew(existing.id, now + EXPIRATION_WINDOW)
            .await?;

        info!(token = %renewed.short_token, "Expired mapping renewed");
        metrics::counter!("tinylink_mappings_renewed_total").increment(1);

        Ok(Shortened {
            mapping: renewed,
            outcome: ShortenOutcome::Renewed,
        })
    }

    /// Stores a new mapping, walking the salted token candidates on collision.
    ///
    /// A `long_url` conflict means a concurrent caller stored the same URL
    /// first; its row is re-read and returned instead.
    async fn create(&self, long_url: &str, now: DateTime<Utc>) -> Result<Shortened, AppError> {
        for attempt in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_token(long_url, attempt);

            if let Some(holder) = self.mappings.find_by_token(&token).await? {
                if holder.long_url == long_url {
                    return self.reuse(holder, now).await;
                }

                warn!(token = %token, attempt, "Token collision, trying salted candidate");
                continue;
            }

            match self
                .mappings
                .create(NewMapping::expiring(long_url, token.clone(), now))
                .await
            {
                Ok(mapping) => {
                    info!(token = %mapping.short_token, "Mapping created");
                    metrics::counter!("tinylink_mappings_created_total").increment(1);
                    return Ok(Shortened {
                        mapping,
                        outcome: ShortenOutcome::Created,
                    });
                }
                Err(e) if e.is_conflict_on(LONG_URL_UNIQUE) => {
                    debug!("Concurrent insert for the same long URL, re-reading");
                    let winner = self
                        .mappings
                        .find_by_long_url(long_url)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal(
                                "Mapping vanished after unique violation",
                                json!({ "long_url": long_url }),
                            )
                        })?;
                    return self.reuse(winner, now).await;
                }
                Err(e) if e.is_conflict_on(SHORT_TOKEN_UNIQUE) => {
                    warn!(
                        token = %token,
                        attempt,
                        "Token taken concurrently, trying salted candidate"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::GenerationFailure {
            reason: format!("Too many collisions after {MAX_TOKEN_ATTEMPTS} attempts"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::entities::Stats;
    use crate::domain::repositories::{MockMappingRepository, MockStatsRepository};
    use chrono::{FixedOffset, TimeDelta, TimeZone};

    const URL: &str = "https://www.example.com";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(start(), FixedOffset::east_opt(0).unwrap()))
    }

    fn service(
        mappings: MockMappingRepository,
        stats: MockStatsRepository,
        clock: Arc<ManualClock>,
    ) -> LinkService {
        LinkService::new(Arc::new(mappings), Arc::new(stats), clock)
    }

    fn mapping(id: i64, url: &str, token: &str, expires: Option<DateTime<Utc>>) -> Mapping {
        Mapping::new(id, url.to_string(), token.to_string(), expires)
    }

    #[tokio::test]
    async fn test_shorten_creates_new_mapping() {
        let mut mappings = MockMappingRepository::new();
        let token = generate_token(URL, 0);

        mappings
            .expect_find_by_long_url()
            .times(1)
            .returning(|_| Ok(None));
        mappings
            .expect_find_by_token()
            .times(1)
            .returning(|_| Ok(None));

        let expected_token = token.clone();
        mappings
            .expect_create()
            .withf(move |new| {
                new.long_url == URL
                    && new.short_token == expected_token
                    && new.expiration_time == Some(start() + EXPIRATION_WINDOW)
                    && new.created_at == start()
            })
            .times(1)
            .returning(|new| {
                Ok(Mapping::new(
                    1,
                    new.long_url,
                    new.short_token,
                    new.expiration_time,
                ))
            });

        let result = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap();

        assert_eq!(result.outcome, ShortenOutcome::Created);
        assert_eq!(result.token(), token);
    }

    #[tokio::test]
    async fn test_shorten_returns_live_mapping_untouched() {
        let mut mappings = MockMappingRepository::new();
        let live = mapping(5, URL, "abc123", Some(start() + TimeDelta::minutes(10)));

        mappings
            .expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(live.clone())));
        mappings.expect_create().times(0);
        mappings.expect_renew().times(0);

        let result = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap();

        assert_eq!(result.outcome, ShortenOutcome::Existing);
        assert_eq!(result.token(), "abc123");
    }

    #[tokio::test]
    async fn test_shorten_treats_null_expiration_as_live() {
        let mut mappings = MockMappingRepository::new();
        let forever = mapping(5, URL, "abc123", None);

        mappings
            .expect_find_by_long_url()
            .returning(move |_| Ok(Some(forever.clone())));
        mappings.expect_renew().times(0);

        let result = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap();

        assert_eq!(result.outcome, ShortenOutcome::Existing);
    }

    #[tokio::test]
    async fn test_shorten_renews_expired_mapping() {
        let mut mappings = MockMappingRepository::new();
        let expired = mapping(5, URL, "abc123", Some(start() - TimeDelta::seconds(1)));

        mappings
            .expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(expired.clone())));
        mappings
            .expect_renew()
            .withf(|id, expires| *id == 5 && *expires == start() + EXPIRATION_WINDOW)
            .times(1)
            .returning(|id, expires| {
                Ok(Mapping::new(id, URL.into(), "abc123".into(), Some(expires)))
            });
        mappings.expect_create().times(0);

        let result = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap();

        assert_eq!(result.outcome, ShortenOutcome::Renewed);
        assert_eq!(result.token(), "abc123");
        assert_eq!(
            result.mapping.expiration_time,
            Some(start() + EXPIRATION_WINDOW)
        );
    }

    #[tokio::test]
    async fn test_shorten_rejects_invalid_url_without_storage() {
        let mut mappings = MockMappingRepository::new();
        mappings.expect_find_by_long_url().times(0);
        mappings.expect_create().times(0);

        let service = service(mappings, MockStatsRepository::new(), clock());

        assert!(matches!(
            service.shorten("not-a-url").await.unwrap_err(),
            AppError::InvalidUrlFormat { .. }
        ));
        assert!(matches!(
            service.shorten("").await.unwrap_err(),
            AppError::MissingField { .. }
        ));
    }

    #[tokio::test]
    async fn test_shorten_retries_with_salt_on_collision() {
        let mut mappings = MockMappingRepository::new();
        let first = generate_token(URL, 0);
        let second = generate_token(URL, 1);

        mappings
            .expect_find_by_long_url()
            .returning(|_| Ok(None));

        let taken = first.clone();
        mappings.expect_find_by_token().returning(move |token| {
            if token == taken {
                Ok(Some(mapping(9, "https://other.example", token, None)))
            } else {
                Ok(None)
            }
        });

        let expected = second.clone();
        mappings
            .expect_create()
            .withf(move |new| new.short_token == expected)
            .times(1)
            .returning(|new| {
                Ok(Mapping::new(
                    2,
                    new.long_url,
                    new.short_token,
                    new.expiration_time,
                ))
            });

        let result = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap();

        assert_eq!(result.token(), second);
        assert_ne!(result.token(), first);
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut mappings = MockMappingRepository::new();

        mappings
            .expect_find_by_long_url()
            .returning(|_| Ok(None));
        mappings
            .expect_find_by_token()
            .times(MAX_TOKEN_ATTEMPTS as usize)
            .returning(|token| Ok(Some(mapping(9, "https://other.example", token, None))));
        mappings.expect_create().times(0);

        let err = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationFailure { .. }));
    }

    #[tokio::test]
    async fn test_shorten_recovers_from_concurrent_insert() {
        let mut mappings = MockMappingRepository::new();
        let token = generate_token(URL, 0);
        let mut lookups = 0;

        let winner = mapping(3, URL, &token, Some(start() + EXPIRATION_WINDOW));
        mappings.expect_find_by_long_url().times(2).returning(move |_| {
            lookups += 1;
            if lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
        mappings
            .expect_find_by_token()
            .times(1)
            .returning(|_| Ok(None));
        mappings.expect_create().times(1).returning(|_| {
            Err(AppError::Conflict {
                constraint: Some(LONG_URL_UNIQUE.to_string()),
            })
        });

        let result = service(mappings, MockStatsRepository::new(), clock())
            .shorten(URL)
            .await
            .unwrap();

        assert_eq!(result.outcome, ShortenOutcome::Existing);
        assert_eq!(result.mapping.id, 3);
    }

    #[tokio::test]
    async fn test_resolve_counts_access() {
        let mut mappings = MockMappingRepository::new();
        let mut stats = MockStatsRepository::new();

        mappings
            .expect_find_by_token()
            .withf(|token| token == "abc123")
            .times(1)
            .returning(|_| {
                Ok(Some(mapping(
                    4,
                    URL,
                    "abc123",
                    Some(start() + TimeDelta::minutes(5)),
                )))
            });
        stats
            .expect_record_access()
            .withf(|id, at| *id == 4 && *at == start())
            .times(1)
            .returning(|id, at| Ok(Stats::new(1, id, 1, Some(at))));

        let long_url = service(mappings, stats, clock())
            .resolve("abc123")
            .await
            .unwrap();

        assert_eq!(long_url, URL);
    }

    #[tokio::test]
    async fn test_resolve_expired_is_not_found_and_not_counted() {
        let mut mappings = MockMappingRepository::new();
        let mut stats = MockStatsRepository::new();

        mappings.expect_find_by_token().returning(|_| {
            Ok(Some(mapping(
                4,
                URL,
                "abc123",
                Some(start() - TimeDelta::minutes(1)),
            )))
        });
        stats.expect_record_access().times(0);

        let err = service(mappings, stats, clock())
            .resolve("abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let mut mappings = MockMappingRepository::new();
        let mut stats = MockStatsRepository::new();

        mappings.expect_find_by_token().returning(|_| Ok(None));
        stats.expect_record_access().times(0);

        let err = service(mappings, stats, clock())
            .resolve("ffffff")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_token_skips_storage() {
        let mut mappings = MockMappingRepository::new();
        mappings.expect_find_by_token().times(0);

        let err = service(mappings, MockStatsRepository::new(), clock())
            .resolve("nonexistentshorturl")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
